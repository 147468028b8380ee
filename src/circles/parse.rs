use std::collections::HashSet;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use super::model::{
    ConnectionType, EdgeDetails, EdgeId, Era, GraphMeta, Node, NodeId, NodeType, SocialGraph,
};

const STRENGTH_MIN: u8 = 1;
const STRENGTH_MAX: u8 = 10;

#[derive(Clone, Debug, Deserialize)]
struct RawPayload {
    #[serde(default)]
    nodes: Vec<RawNode>,
    #[serde(default)]
    edges: Vec<RawEdge>,
    #[serde(default)]
    meta: RawMeta,
}

#[derive(Clone, Debug, Deserialize)]
struct RawNode {
    id: NodeId,
    #[serde(rename = "type")]
    node_type: NodeType,
    name: String,
    #[serde(default)]
    book_count: u32,
    #[serde(default)]
    tier: Option<u8>,
    #[serde(default)]
    era: Option<Era>,
    #[serde(default)]
    birth_year: Option<i32>,
    #[serde(default)]
    death_year: Option<i32>,
    #[serde(default)]
    founded_year: Option<i32>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawEdge {
    id: EdgeId,
    source: NodeId,
    target: NodeId,
    #[serde(rename = "type")]
    connection: ConnectionType,
    #[serde(default)]
    strength: Option<i64>,
    #[serde(default)]
    shared_book_ids: Option<Vec<i64>>,
    #[serde(default)]
    evidence: Option<String>,
    #[serde(default)]
    start_year: Option<i32>,
    #[serde(default)]
    end_year: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawMeta {
    #[serde(default)]
    total_books: u32,
    #[serde(default)]
    date_range: Option<(i32, i32)>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub duplicate_nodes: usize,
    pub duplicate_edges: usize,
    pub dangling_edges: usize,
    pub self_loops: usize,
    pub clamped_strengths: usize,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }

    fn log(&self) {
        if self.duplicate_nodes > 0 {
            warn!(count = self.duplicate_nodes, "dropped nodes with duplicate ids");
        }
        if self.duplicate_edges > 0 {
            warn!(count = self.duplicate_edges, "dropped edges with duplicate ids");
        }
        if self.dangling_edges > 0 {
            warn!(
                count = self.dangling_edges,
                "dropped edges referencing unknown nodes"
            );
        }
        if self.self_loops > 0 {
            warn!(count = self.self_loops, "dropped self-referencing edges");
        }
        if self.clamped_strengths > 0 {
            warn!(
                count = self.clamped_strengths,
                "clamped edge strengths into 1..=10"
            );
        }
    }
}

pub fn parse_social_circles(raw: &str) -> Result<(SocialGraph, LoadReport)> {
    let payload: RawPayload =
        serde_json::from_str(raw).context("invalid social circles JSON payload")?;
    let mut report = LoadReport::default();

    let mut seen_nodes = HashSet::with_capacity(payload.nodes.len());
    let mut nodes = Vec::with_capacity(payload.nodes.len());
    for raw_node in payload.nodes {
        if !seen_nodes.insert(raw_node.id.clone()) {
            report.duplicate_nodes += 1;
            continue;
        }

        nodes.push(Node {
            id: raw_node.id,
            node_type: raw_node.node_type,
            name: raw_node.name,
            book_count: raw_node.book_count,
            tier: raw_node.tier,
            era: raw_node.era,
            birth_year: raw_node.birth_year,
            death_year: raw_node.death_year,
            founded_year: raw_node.founded_year,
        });
    }

    let mut seen_edges = HashSet::with_capacity(payload.edges.len());
    let mut edges = Vec::with_capacity(payload.edges.len());
    for raw_edge in payload.edges {
        if raw_edge.source == raw_edge.target {
            report.self_loops += 1;
            continue;
        }
        if !seen_nodes.contains(&raw_edge.source) || !seen_nodes.contains(&raw_edge.target) {
            report.dangling_edges += 1;
            continue;
        }
        if !seen_edges.insert(raw_edge.id.clone()) {
            report.duplicate_edges += 1;
            continue;
        }

        let strength = raw_edge.strength.map(|value| {
            let clamped = value.clamp(i64::from(STRENGTH_MIN), i64::from(STRENGTH_MAX));
            if clamped != value {
                report.clamped_strengths += 1;
            }
            clamped as u8
        });

        edges.push((
            raw_edge.id,
            raw_edge.source,
            raw_edge.target,
            EdgeDetails {
                connection: raw_edge.connection,
                strength,
                shared_book_ids: raw_edge.shared_book_ids.unwrap_or_default(),
                evidence: raw_edge.evidence.filter(|text| !text.trim().is_empty()),
                start_year: raw_edge.start_year,
                end_year: raw_edge.end_year,
            },
        ));
    }

    let meta = GraphMeta {
        total_books: payload.meta.total_books,
        date_range: payload.meta.date_range,
    };

    let graph = SocialGraph::from_records(nodes, edges, meta);
    report.log();
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "parsed social circles payload"
    );

    Ok((graph, report))
}
