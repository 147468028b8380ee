use std::collections::{HashMap, HashSet};

use eframe::egui::Vec2;
use tracing::{debug, info};

use crate::circles::{EdgeId, FilteredView, HubView, NodeId, NodeType, SocialGraph};

use super::layout::{LayoutEdge, LayoutMode, LayoutNode, run_layout};
use super::render_utils::node_radius;

/// Narrow view of the drawn graph, independent of how it is drawn.
pub(crate) trait GraphHandle {
    fn node_count(&self) -> usize;
    fn select_node(&mut self, id: &NodeId) -> bool;
    fn neighbors(&self, id: &NodeId) -> Vec<NodeId>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Selection {
    Node(NodeId),
    Edge(EdgeId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SceneEvent {
    NodeSelected(NodeId),
    EdgeSelected(EdgeId),
    NodeHovered(Option<NodeId>),
    ViewportChanged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SyncOutcome {
    Unchanged,
    Rebuilt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SceneStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub layout: LayoutMode,
    pub revision: u64,
    pub layout_runs: u64,
}

pub(in crate::app) struct SceneNode {
    pub id: NodeId,
    pub graph_index: usize,
    pub node_type: NodeType,
    pub world_pos: Vec2,
    pub base_radius: f32,
    pub hidden_count: usize,
}

pub(in crate::app) struct SceneEdge {
    pub id: EdgeId,
    pub graph_index: usize,
    pub from: usize,
    pub to: usize,
}

/// Emphasized elements; everything else is drawn dimmed while non-empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct HighlightState {
    pub related_nodes: HashSet<NodeId>,
    pub related_edges: HashSet<EdgeId>,
    pub path_nodes: HashSet<NodeId>,
    pub path_edges: HashSet<EdgeId>,
}

impl HighlightState {
    pub fn is_active(&self) -> bool {
        !self.related_nodes.is_empty()
            || !self.related_edges.is_empty()
            || !self.path_nodes.is_empty()
            || !self.path_edges.is_empty()
    }
}

/// Owns everything the renderer draws. `sync` is the only way the drawn
/// element set changes.
pub(crate) struct Scene {
    pub(in crate::app) nodes: Vec<SceneNode>,
    pub(in crate::app) edges: Vec<SceneEdge>,
    index_by_id: HashMap<NodeId, usize>,
    adjacency: Vec<Vec<usize>>,
    node_key: Vec<NodeId>,
    edge_key: Vec<EdgeId>,
    layout: LayoutMode,
    revision: u64,
    layout_runs: u64,
    selection: Option<Selection>,
    hovered: Option<NodeId>,
    pub(in crate::app) highlight: HighlightState,
    events: Vec<SceneEvent>,
}

impl Scene {
    pub fn new(layout: LayoutMode) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            index_by_id: HashMap::new(),
            adjacency: Vec::new(),
            node_key: Vec::new(),
            edge_key: Vec::new(),
            layout,
            revision: 0,
            layout_runs: 0,
            selection: None,
            hovered: None,
            highlight: HighlightState::default(),
            events: Vec::new(),
        }
    }

    pub fn stats(&self) -> SceneStats {
        SceneStats {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
            layout: self.layout,
            revision: self.revision,
            layout_runs: self.layout_runs,
        }
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn selected_node(&self) -> Option<&NodeId> {
        match &self.selection {
            Some(Selection::Node(id)) => Some(id),
            _ => None,
        }
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.index_by_id.contains_key(id)
    }

    pub(in crate::app) fn scene_index(&self, id: &NodeId) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    /// Reconciles the drawn elements with the disclosed subgraph. When the
    /// id sets match only the badge counts are refreshed.
    pub fn sync(
        &mut self,
        graph: &SocialGraph,
        filtered: &FilteredView,
        hub_view: &HubView,
    ) -> SyncOutcome {
        let node_indices = hub_view.node_indices().collect::<Vec<_>>();
        let mut edge_indices = hub_view.edge_indices(graph, filtered).collect::<Vec<_>>();
        edge_indices.sort_by(|a, b| graph.edges[*a].id.cmp(&graph.edges[*b].id));

        let node_key = node_indices
            .iter()
            .map(|index| graph.nodes[*index].id.clone())
            .collect::<Vec<_>>();
        let edge_key = edge_indices
            .iter()
            .map(|index| graph.edges[*index].id.clone())
            .collect::<Vec<_>>();

        if node_key == self.node_key && edge_key == self.edge_key {
            for node in &mut self.nodes {
                node.hidden_count = hub_view.hidden_count(node.graph_index);
            }
            debug!(nodes = self.nodes.len(), "scene unchanged, layout skipped");
            return SyncOutcome::Unchanged;
        }

        let (min_books, max_books) = node_indices
            .iter()
            .map(|index| graph.nodes[*index].book_count.max(1))
            .fold((u32::MAX, 0), |(min, max), books| {
                (min.min(books), max.max(books))
            });

        self.nodes = node_indices
            .iter()
            .map(|&graph_index| {
                let node = &graph.nodes[graph_index];
                SceneNode {
                    id: node.id.clone(),
                    graph_index,
                    node_type: node.node_type,
                    world_pos: Vec2::ZERO,
                    base_radius: node_radius(node.book_count.max(1), min_books, max_books),
                    hidden_count: hub_view.hidden_count(graph_index),
                }
            })
            .collect();
        self.index_by_id = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect();

        self.edges = edge_indices
            .iter()
            .filter_map(|&graph_index| {
                let edge = &graph.edges[graph_index];
                let from = self.index_by_id.get(&graph.nodes[edge.source].id)?;
                let to = self.index_by_id.get(&graph.nodes[edge.target].id)?;
                Some(SceneEdge {
                    id: edge.id.clone(),
                    graph_index,
                    from: *from,
                    to: *to,
                })
            })
            .collect();

        self.adjacency = vec![Vec::new(); self.nodes.len()];
        for edge in &self.edges {
            self.adjacency[edge.from].push(edge.to);
            self.adjacency[edge.to].push(edge.from);
        }
        for neighbors in &mut self.adjacency {
            neighbors.sort_unstable();
            neighbors.dedup();
        }

        self.node_key = node_key;
        self.edge_key = edge_key;
        self.revision = self.revision.wrapping_add(1);
        self.drop_stale_selection();
        self.relayout(graph);

        SyncOutcome::Rebuilt
    }

    pub fn set_layout(&mut self, graph: &SocialGraph, layout: LayoutMode) {
        if self.layout == layout {
            return;
        }
        self.layout = layout;
        self.relayout(graph);
    }

    pub fn relayout(&mut self, graph: &SocialGraph) {
        let layout_nodes = self
            .nodes
            .iter()
            .map(|node| LayoutNode {
                id: node.id.as_str(),
                name: graph.nodes[node.graph_index].name.as_str(),
                node_type: node.node_type,
                radius: node.base_radius,
            })
            .collect::<Vec<_>>();
        let layout_edges = self
            .edges
            .iter()
            .map(|edge| LayoutEdge {
                from: edge.from,
                to: edge.to,
                strength: graph.edges[edge.graph_index].strength,
            })
            .collect::<Vec<_>>();

        let positions = run_layout(self.layout, &layout_nodes, &layout_edges);
        for (node, position) in self.nodes.iter_mut().zip(positions) {
            node.world_pos = position;
        }

        self.layout_runs += 1;
        info!(
            layout = self.layout.label(),
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "layout run"
        );
    }

    fn drop_stale_selection(&mut self) {
        let stale = match &self.selection {
            Some(Selection::Node(id)) => !self.index_by_id.contains_key(id),
            Some(Selection::Edge(id)) => self.edge_key.binary_search(id).is_err(),
            None => false,
        };
        if stale {
            self.selection = None;
        }
        if self
            .hovered
            .as_ref()
            .is_some_and(|id| !self.index_by_id.contains_key(id))
        {
            self.hovered = None;
        }
    }

    pub fn select_edge(&mut self, id: &EdgeId) -> bool {
        if self.edge_key.binary_search(id).is_err() {
            return false;
        }
        if self.selection.as_ref() != Some(&Selection::Edge(id.clone())) {
            self.selection = Some(Selection::Edge(id.clone()));
            self.events.push(SceneEvent::EdgeSelected(id.clone()));
        }
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn set_hovered(&mut self, id: Option<NodeId>) {
        if self.hovered != id {
            self.hovered = id.clone();
            self.events.push(SceneEvent::NodeHovered(id));
        }
    }

    pub fn notify_viewport_changed(&mut self) {
        if self.events.last() != Some(&SceneEvent::ViewportChanged) {
            self.events.push(SceneEvent::ViewportChanged);
        }
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn set_highlight(&mut self, highlight: HighlightState) {
        self.highlight = highlight;
    }

    pub fn is_dimmed_node(&self, id: &NodeId) -> bool {
        self.highlight.is_active()
            && !self.highlight.related_nodes.contains(id)
            && !self.highlight.path_nodes.contains(id)
    }

    pub fn is_dimmed_edge(&self, id: &EdgeId) -> bool {
        self.highlight.is_active()
            && !self.highlight.related_edges.contains(id)
            && !self.highlight.path_edges.contains(id)
    }

    pub fn incident_edges(&self, id: &NodeId) -> Vec<&EdgeId> {
        let Some(index) = self.scene_index(id) else {
            return Vec::new();
        };
        self.edges
            .iter()
            .filter(|edge| edge.from == index || edge.to == index)
            .map(|edge| &edge.id)
            .collect()
    }
}

impl GraphHandle for Scene {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn select_node(&mut self, id: &NodeId) -> bool {
        if !self.index_by_id.contains_key(id) {
            return false;
        }
        if self.selected_node() != Some(id) {
            self.selection = Some(Selection::Node(id.clone()));
            self.events.push(SceneEvent::NodeSelected(id.clone()));
        }
        true
    }

    fn neighbors(&self, id: &NodeId) -> Vec<NodeId> {
        let Some(index) = self.scene_index(id) else {
            return Vec::new();
        };
        self.adjacency[index]
            .iter()
            .map(|neighbor| self.nodes[*neighbor].id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::circles::fixtures::star;
    use crate::circles::{HubBudget, HubLevel, HubState, rank_nodes};

    use super::*;

    fn hub_view(graph: &SocialGraph, state: &HubState) -> (FilteredView, HubView) {
        let filtered = FilteredView::all(graph);
        let view = HubView::compute(
            graph,
            &filtered,
            &rank_nodes(graph),
            state,
            HubBudget::default(),
        );
        (filtered, view)
    }

    #[test]
    fn unchanged_element_set_skips_layout() {
        let graph = star(60);
        let state = HubState::new(HubBudget::default(), graph.node_count());
        let (filtered, view) = hub_view(&graph, &state);

        let mut scene = Scene::new(LayoutMode::Grid);
        assert_eq!(scene.sync(&graph, &filtered, &view), SyncOutcome::Rebuilt);
        let first = scene.stats();
        assert_eq!(first.node_count, 25);
        assert_eq!(first.layout_runs, 1);

        assert_eq!(scene.sync(&graph, &filtered, &view), SyncOutcome::Unchanged);
        let second = scene.stats();
        assert_eq!(second.layout_runs, 1);
        assert_eq!(second.revision, first.revision);
    }

    #[test]
    fn changed_element_set_rebuilds_and_relayouts() {
        let graph = star(60);
        let mut state = HubState::new(HubBudget::default(), graph.node_count());
        let (filtered, view) = hub_view(&graph, &state);
        let mut scene = Scene::new(LayoutMode::Circle);
        scene.sync(&graph, &filtered, &view);

        state.level = HubLevel::Full;
        let (filtered, view) = hub_view(&graph, &state);
        assert_eq!(scene.sync(&graph, &filtered, &view), SyncOutcome::Rebuilt);
        assert_eq!(scene.stats().node_count, 60);
        assert_eq!(scene.stats().layout_runs, 2);
    }

    #[test]
    fn layout_change_forces_relayout() {
        let graph = star(10);
        let state = HubState::new(HubBudget::default(), graph.node_count());
        let (filtered, view) = hub_view(&graph, &state);
        let mut scene = Scene::new(LayoutMode::Force);
        scene.sync(&graph, &filtered, &view);

        scene.set_layout(&graph, LayoutMode::Force);
        assert_eq!(scene.stats().layout_runs, 1);
        scene.set_layout(&graph, LayoutMode::Hierarchy);
        assert_eq!(scene.stats().layout_runs, 2);
        assert_eq!(scene.layout(), LayoutMode::Hierarchy);
    }

    #[test]
    fn selection_emits_events_once_and_survives_unchanged_sync() {
        let graph = star(10);
        let state = HubState::new(HubBudget::default(), graph.node_count());
        let (filtered, view) = hub_view(&graph, &state);
        let mut scene = Scene::new(LayoutMode::Grid);
        scene.sync(&graph, &filtered, &view);

        let hub = NodeId::new("hub");
        assert!(scene.select_node(&hub));
        assert!(scene.select_node(&hub));
        assert!(!scene.select_node(&NodeId::new("nobody")));
        assert_eq!(
            scene.drain_events(),
            vec![SceneEvent::NodeSelected(hub.clone())]
        );

        scene.sync(&graph, &filtered, &view);
        assert_eq!(scene.selected_node(), Some(&hub));
        assert_eq!(scene.neighbors(&hub).len(), 9);
    }

    #[test]
    fn viewport_notifications_coalesce() {
        let mut scene = Scene::new(LayoutMode::Grid);
        scene.notify_viewport_changed();
        scene.notify_viewport_changed();
        scene.set_hovered(Some(NodeId::new("a")));
        scene.set_hovered(Some(NodeId::new("a")));
        assert_eq!(
            scene.drain_events(),
            vec![
                SceneEvent::ViewportChanged,
                SceneEvent::NodeHovered(Some(NodeId::new("a")))
            ]
        );
        assert!(scene.drain_events().is_empty());
    }

    #[test]
    fn highlight_dims_everything_else() {
        let mut scene = Scene::new(LayoutMode::Grid);
        let a = NodeId::new("a");
        let b = NodeId::new("b");
        assert!(!scene.is_dimmed_node(&b));

        let mut highlight = HighlightState::default();
        highlight.related_nodes.insert(a.clone());
        scene.set_highlight(highlight);
        assert!(!scene.is_dimmed_node(&a));
        assert!(scene.is_dimmed_node(&b));
    }
}
