use crate::circles::PathResult;

use super::scene::{GraphHandle, HighlightState, Scene, Selection};

/// Emphasis for the current selection plus any found path. Selecting a node
/// lights it and its drawn neighbors; selecting an edge lights its endpoints.
pub(super) fn build_highlight_state(scene: &Scene, path: &PathResult) -> HighlightState {
    let mut highlight = HighlightState::default();

    match scene.selection() {
        Some(Selection::Node(id)) => {
            highlight.related_nodes.insert(id.clone());
            highlight.related_nodes.extend(scene.neighbors(id));
            highlight
                .related_edges
                .extend(scene.incident_edges(id).into_iter().cloned());
        }
        Some(Selection::Edge(id)) => {
            if let Some(edge) = scene.edges.iter().find(|edge| &edge.id == id) {
                highlight.related_edges.insert(edge.id.clone());
                highlight
                    .related_nodes
                    .insert(scene.nodes[edge.from].id.clone());
                highlight
                    .related_nodes
                    .insert(scene.nodes[edge.to].id.clone());
            }
        }
        None => {}
    }

    if let PathResult::Found { nodes, edges } = path {
        highlight.path_nodes.extend(nodes.iter().cloned());
        highlight.path_edges.extend(edges.iter().cloned());
    }

    highlight
}
