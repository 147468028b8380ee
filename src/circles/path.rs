use std::collections::VecDeque;

use thiserror::Error;

use super::filter::FilteredView;
use super::hub::HubView;
use super::model::{EdgeId, NodeId, SocialGraph};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PathScope {
    /// Every loaded node and edge, regardless of filters or hub level.
    #[default]
    Full,
    /// Only what is currently drawn.
    Visible,
}

impl PathScope {
    pub fn label(self) -> &'static str {
        match self {
            Self::Full => "whole graph",
            Self::Visible => "visible graph",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathQueryError {
    #[error("choose a start and an end entity")]
    MissingEndpoint,
    #[error("choose two different entities")]
    SameEndpoints,
    #[error("unknown entity {0}")]
    UnknownNode(NodeId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathQuery {
    start: usize,
    end: usize,
}

impl PathQuery {
    pub fn new(graph: &SocialGraph, start: &NodeId, end: &NodeId) -> Result<Self, PathQueryError> {
        if start == end {
            return Err(PathQueryError::SameEndpoints);
        }
        let start_index = graph
            .index_of(start)
            .ok_or_else(|| PathQueryError::UnknownNode(start.clone()))?;
        let end_index = graph
            .index_of(end)
            .ok_or_else(|| PathQueryError::UnknownNode(end.clone()))?;

        Ok(Self {
            start: start_index,
            end: end_index,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PathResult {
    #[default]
    NotSearched,
    NoPath,
    Found {
        nodes: Vec<NodeId>,
        edges: Vec<EdgeId>,
    },
}

impl PathResult {
    pub fn degrees(&self) -> Option<usize> {
        match self {
            Self::Found { nodes, .. } => Some(nodes.len() - 1),
            Self::NotSearched | Self::NoPath => None,
        }
    }

    pub fn is_searched(&self) -> bool {
        !matches!(self, Self::NotSearched)
    }
}

/// Breadth-first search from `query.start` to `query.end`.
///
/// Adjacency lists are sorted by neighbor index (which is id order), so among
/// equally short paths the one through the lowest ids at each layer wins.
/// `allow` decides which (neighbor, edge) hops may be walked.
pub fn find_path<F>(graph: &SocialGraph, query: &PathQuery, allow: F) -> PathResult
where
    F: Fn(usize, usize) -> bool,
{
    let node_count = graph.node_count();
    let mut visited = vec![false; node_count];
    let mut parent = vec![None; node_count];
    let mut queue = VecDeque::from([query.start]);
    visited[query.start] = true;

    while let Some(current) = queue.pop_front() {
        if current == query.end {
            break;
        }

        for link in graph.links(current) {
            if visited[link.neighbor] || !allow(link.neighbor, link.edge) {
                continue;
            }
            visited[link.neighbor] = true;
            parent[link.neighbor] = Some((current, link.edge));
            queue.push_back(link.neighbor);
        }
    }

    if !visited[query.end] {
        return PathResult::NoPath;
    }

    let mut nodes = vec![graph.nodes[query.end].id.clone()];
    let mut edges = Vec::new();
    let mut cursor = query.end;
    while let Some((previous, edge)) = parent[cursor] {
        edges.push(graph.edges[edge].id.clone());
        nodes.push(graph.nodes[previous].id.clone());
        cursor = previous;
    }

    nodes.reverse();
    edges.reverse();
    PathResult::Found { nodes, edges }
}

pub fn shortest_path(graph: &SocialGraph, query: &PathQuery) -> PathResult {
    find_path(graph, query, |_, _| true)
}

/// Search restricted by `scope`. With `PathScope::Visible` both endpoints and
/// every hop must be drawn, and only filtered edges are walked.
pub fn scoped_path(
    graph: &SocialGraph,
    query: &PathQuery,
    scope: PathScope,
    filtered: &FilteredView,
    hub_view: &HubView,
) -> PathResult {
    match scope {
        PathScope::Full => shortest_path(graph, query),
        PathScope::Visible => {
            if !hub_view.contains(query.start) || !hub_view.contains(query.end) {
                return PathResult::NoPath;
            }
            find_path(graph, query, |neighbor, edge| {
                filtered.contains_edge(edge) && hub_view.contains(neighbor)
            })
        }
    }
}
