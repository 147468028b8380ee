use std::collections::VecDeque;
use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::circles::NodeType;
use crate::util::stable_pair;

use self::quadtree::{Repulsion, RepulsionTree};

mod quadtree;

const FORCE_ITERATIONS: usize = 260;
const REPULSION_THETA: f32 = 0.8;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum LayoutMode {
    #[default]
    Force,
    Circle,
    Grid,
    Hierarchy,
}

impl LayoutMode {
    pub const ALL: [Self; 4] = [Self::Force, Self::Circle, Self::Grid, Self::Hierarchy];

    pub fn label(self) -> &'static str {
        match self {
            Self::Force => "Force",
            Self::Circle => "Circle",
            Self::Grid => "Grid",
            Self::Hierarchy => "Hierarchy",
        }
    }
}

pub(in crate::app) struct LayoutNode<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub node_type: NodeType,
    pub radius: f32,
}

pub(in crate::app) struct LayoutEdge {
    pub from: usize,
    pub to: usize,
    /// 1..=10, `None` treated as 5.
    pub strength: Option<u8>,
}

pub(in crate::app) fn run_layout(
    mode: LayoutMode,
    nodes: &[LayoutNode<'_>],
    edges: &[LayoutEdge],
) -> Vec<Vec2> {
    match mode {
        LayoutMode::Force => force_layout(nodes, edges, FORCE_ITERATIONS),
        LayoutMode::Circle => circle_layout(nodes),
        LayoutMode::Grid => grid_layout(nodes),
        LayoutMode::Hierarchy => hierarchy_layout(nodes, edges),
    }
}

fn spring_scale(strength: Option<u8>) -> f32 {
    0.6 + f32::from(strength.unwrap_or(5).clamp(1, 10)) * 0.08
}

fn force_layout(nodes: &[LayoutNode<'_>], edges: &[LayoutEdge], iterations: usize) -> Vec<Vec2> {
    let n = nodes.len();
    if n == 0 {
        return Vec::new();
    }

    let base_radius = (n as f32).sqrt() * 90.0;
    let mut positions = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let angle = (index as f32 / n as f32) * TAU;
            let (jx, jy) = stable_pair(node.id);
            vec2(angle.cos(), angle.sin()) * base_radius + vec2(jx, jy) * 40.0
        })
        .collect::<Vec<_>>();

    if n == 1 {
        return vec![Vec2::ZERO];
    }

    let area = (base_radius * 2.2).powi(2);
    let k = (area / n as f32).sqrt().max(24.0);
    let mut temperature = (k * 4.0).max(120.0);
    let radii = nodes.iter().map(|node| node.radius).collect::<Vec<_>>();
    let repulsion = Repulsion {
        k_sq: k * k,
        theta: REPULSION_THETA,
        radii: &radii,
    };

    for _ in 0..iterations {
        let Some(tree) = RepulsionTree::build(&positions) else {
            break;
        };
        let mut disp = (0..n)
            .map(|index| tree.force_on(index, &positions, repulsion))
            .collect::<Vec<_>>();

        for edge in edges {
            if edge.from >= n || edge.to >= n || edge.from == edge.to {
                continue;
            }

            let delta = positions[edge.from] - positions[edge.to];
            let distance = delta.length().max(0.5);
            let direction = delta / distance;
            let ideal = k + (nodes[edge.from].radius + nodes[edge.to].radius) * 2.0;
            let force = (distance - ideal) * 0.16 * spring_scale(edge.strength);

            disp[edge.from] -= direction * force;
            disp[edge.to] += direction * force;
        }

        for (position, d) in positions.iter_mut().zip(disp.iter_mut()) {
            *d -= *position * 0.0015;
            let length = d.length();
            if length > 0.0 {
                *position += *d / length * length.min(temperature) * 0.9;
            }
        }

        temperature *= 0.965;
        if temperature < 0.5 {
            break;
        }
    }

    let centroid = positions.iter().fold(Vec2::ZERO, |sum, p| sum + *p) / n as f32;
    for position in &mut positions {
        *position -= centroid;
    }
    positions
}

fn type_rank(node_type: NodeType) -> usize {
    match node_type {
        NodeType::Author => 0,
        NodeType::Publisher => 1,
        NodeType::Binder => 2,
    }
}

/// Nodes sorted by type then name, so each type occupies one arc.
fn circle_layout(nodes: &[LayoutNode<'_>]) -> Vec<Vec2> {
    let n = nodes.len();
    let mut order = (0..n).collect::<Vec<_>>();
    order.sort_by(|a, b| {
        type_rank(nodes[*a].node_type)
            .cmp(&type_rank(nodes[*b].node_type))
            .then_with(|| nodes[*a].name.cmp(nodes[*b].name))
    });

    let circumference = nodes.iter().map(|node| node.radius * 3.2).sum::<f32>();
    let radius = (circumference / TAU).max(60.0);

    let mut positions = vec![Vec2::ZERO; n];
    if n == 1 {
        return positions;
    }
    for (slot, index) in order.into_iter().enumerate() {
        let angle = (slot as f32 / n as f32) * TAU - TAU / 4.0;
        positions[index] = vec2(angle.cos(), angle.sin()) * radius;
    }
    positions
}

fn grid_layout(nodes: &[LayoutNode<'_>]) -> Vec<Vec2> {
    let n = nodes.len();
    if n == 0 {
        return Vec::new();
    }

    let mut order = (0..n).collect::<Vec<_>>();
    order.sort_by(|a, b| {
        type_rank(nodes[*a].node_type)
            .cmp(&type_rank(nodes[*b].node_type))
            .then_with(|| nodes[*a].name.cmp(nodes[*b].name))
    });

    let columns = (n as f32).sqrt().ceil() as usize;
    let rows = n.div_ceil(columns);
    let cell = nodes.iter().map(|node| node.radius).fold(0.0_f32, f32::max) * 3.0 + 40.0;
    let origin = vec2(
        -((columns - 1) as f32) * cell * 0.5,
        -((rows - 1) as f32) * cell * 0.5,
    );

    let mut positions = vec![Vec2::ZERO; n];
    for (slot, index) in order.into_iter().enumerate() {
        let column = slot % columns;
        let row = slot / columns;
        positions[index] = origin + vec2(column as f32 * cell, row as f32 * cell);
    }
    positions
}

/// Breadth-first layers from the best-connected node of each component.
/// Components are laid out left to right.
fn hierarchy_layout(nodes: &[LayoutNode<'_>], edges: &[LayoutEdge]) -> Vec<Vec2> {
    const LAYER_GAP: f32 = 120.0;
    const SIBLING_GAP: f32 = 70.0;
    const COMPONENT_GAP: f32 = 140.0;

    let n = nodes.len();
    let mut adjacency = vec![Vec::new(); n];
    for edge in edges {
        if edge.from < n && edge.to < n && edge.from != edge.to {
            adjacency[edge.from].push(edge.to);
            adjacency[edge.to].push(edge.from);
        }
    }
    for neighbors in &mut adjacency {
        neighbors.sort_unstable();
        neighbors.dedup();
    }

    let mut roots = (0..n).collect::<Vec<_>>();
    roots.sort_by(|a, b| {
        adjacency[*b]
            .len()
            .cmp(&adjacency[*a].len())
            .then_with(|| nodes[*a].id.cmp(nodes[*b].id))
    });

    let mut positions = vec![Vec2::ZERO; n];
    let mut depth = vec![usize::MAX; n];
    let mut cursor_x = 0.0_f32;

    for root in roots {
        if depth[root] != usize::MAX {
            continue;
        }

        let mut layers: Vec<Vec<usize>> = Vec::new();
        let mut queue = VecDeque::from([root]);
        depth[root] = 0;
        while let Some(current) = queue.pop_front() {
            let level = depth[current];
            if layers.len() <= level {
                layers.push(Vec::new());
            }
            layers[level].push(current);

            for &next in &adjacency[current] {
                if depth[next] == usize::MAX {
                    depth[next] = level + 1;
                    queue.push_back(next);
                }
            }
        }

        let width = layers.iter().map(Vec::len).max().unwrap_or(1) as f32 * SIBLING_GAP;
        for (level, members) in layers.iter().enumerate() {
            let row_width = (members.len().saturating_sub(1)) as f32 * SIBLING_GAP;
            let start = cursor_x + (width - row_width) * 0.5;
            for (slot, &index) in members.iter().enumerate() {
                positions[index] = vec2(start + slot as f32 * SIBLING_GAP, level as f32 * LAYER_GAP);
            }
        }
        cursor_x += width + COMPONENT_GAP;
    }

    if n > 0 {
        let centroid = positions.iter().fold(Vec2::ZERO, |sum, p| sum + *p) / n as f32;
        for position in &mut positions {
            *position -= centroid;
        }
    }
    positions
}
