use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Author,
    Publisher,
    Binder,
}

impl NodeType {
    pub const ALL: [Self; 3] = [Self::Author, Self::Publisher, Self::Binder];

    pub fn label(self) -> &'static str {
        match self {
            Self::Author => "Author",
            Self::Publisher => "Publisher",
            Self::Binder => "Binder",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    Publisher,
    SharedPublisher,
    Binder,
    Family,
    Friendship,
    Influence,
    Collaboration,
    Scandal,
}

impl ConnectionType {
    pub const ALL: [Self; 8] = [
        Self::Publisher,
        Self::SharedPublisher,
        Self::Binder,
        Self::Family,
        Self::Friendship,
        Self::Influence,
        Self::Collaboration,
        Self::Scandal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Publisher => "Published by",
            Self::SharedPublisher => "Shared publisher",
            Self::Binder => "Bound by",
            Self::Family => "Family",
            Self::Friendship => "Friendship",
            Self::Influence => "Influence",
            Self::Collaboration => "Collaboration",
            Self::Scandal => "Scandal",
        }
    }

    /// Relationships inferred by the annotation pipeline rather than derived
    /// from shared books.
    pub fn is_ai_discovered(self) -> bool {
        matches!(
            self,
            Self::Family | Self::Friendship | Self::Influence | Self::Collaboration | Self::Scandal
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Era {
    PreRomantic,
    Romantic,
    Victorian,
    Edwardian,
    #[serde(rename = "post_1910")]
    Post1910,
    #[serde(other)]
    Unknown,
}

impl Era {
    pub const ALL: [Self; 6] = [
        Self::PreRomantic,
        Self::Romantic,
        Self::Victorian,
        Self::Edwardian,
        Self::Post1910,
        Self::Unknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::PreRomantic => "Pre-Romantic",
            Self::Romantic => "Romantic",
            Self::Victorian => "Victorian",
            Self::Edwardian => "Edwardian",
            Self::Post1910 => "Post-1910",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub node_type: NodeType,
    pub name: String,
    pub book_count: u32,
    pub tier: Option<u8>,
    pub era: Option<Era>,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
    pub founded_year: Option<i32>,
}

impl Node {
    pub fn is_tier1(&self) -> bool {
        self.tier == Some(1)
    }

    pub fn lifespan(&self) -> Option<String> {
        match (self.birth_year, self.death_year, self.founded_year) {
            (Some(birth), Some(death), _) => Some(format!("{birth}–{death}")),
            (Some(birth), None, _) => Some(format!("b. {birth}")),
            (None, Some(death), _) => Some(format!("d. {death}")),
            (None, None, Some(founded)) => Some(format!("founded {founded}")),
            (None, None, None) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: usize,
    pub target: usize,
    pub connection: ConnectionType,
    pub strength: Option<u8>,
    pub shared_book_ids: Vec<i64>,
    pub evidence: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphMeta {
    pub total_books: u32,
    pub date_range: Option<(i32, i32)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Link {
    pub neighbor: usize,
    pub edge: usize,
}

/// The full relationship graph. Nodes are stored in id order, so index order
/// and id order agree; adjacency lists are sorted by neighbor index.
#[derive(Clone, Debug, Default)]
pub struct SocialGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub meta: GraphMeta,
    index_by_id: HashMap<NodeId, usize>,
    edge_index_by_id: HashMap<EdgeId, usize>,
    adjacency: Vec<Vec<Link>>,
}

impl SocialGraph {
    /// Builds the graph from already validated parts. Edge endpoints must be
    /// indices into `nodes` after sorting, which `from_records` guarantees.
    pub(super) fn from_sorted(nodes: Vec<Node>, edges: Vec<Edge>, meta: GraphMeta) -> Self {
        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect::<HashMap<_, _>>();
        let edge_index_by_id = edges
            .iter()
            .enumerate()
            .map(|(index, edge)| (edge.id.clone(), index))
            .collect::<HashMap<_, _>>();

        let mut adjacency = vec![Vec::new(); nodes.len()];
        for (index, edge) in edges.iter().enumerate() {
            adjacency[edge.source].push(Link {
                neighbor: edge.target,
                edge: index,
            });
            adjacency[edge.target].push(Link {
                neighbor: edge.source,
                edge: index,
            });
        }
        for links in &mut adjacency {
            links.sort_unstable();
        }

        Self {
            nodes,
            edges,
            meta,
            index_by_id,
            edge_index_by_id,
            adjacency,
        }
    }

    /// Assembles a graph from node records and `(source, target)` id pairs.
    pub fn from_records(
        mut nodes: Vec<Node>,
        edges: Vec<(EdgeId, NodeId, NodeId, EdgeDetails)>,
        meta: GraphMeta,
    ) -> Self {
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes.dedup_by(|b, a| a.id == b.id);

        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect::<HashMap<_, _>>();

        let edges = edges
            .into_iter()
            .filter_map(|(id, source, target, details)| {
                let source = *index_by_id.get(&source)?;
                let target = *index_by_id.get(&target)?;
                (source != target).then(|| Edge {
                    id,
                    source,
                    target,
                    connection: details.connection,
                    strength: details.strength,
                    shared_book_ids: details.shared_book_ids,
                    evidence: details.evidence,
                    start_year: details.start_year,
                    end_year: details.end_year,
                })
            })
            .collect::<Vec<_>>();

        Self::from_sorted(nodes, edges, meta)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn edge_index_of(&self, id: &EdgeId) -> Option<usize> {
        self.edge_index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edge_index_of(id).map(|index| &self.edges[index])
    }

    pub fn links(&self, index: usize) -> &[Link] {
        self.adjacency.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn degree(&self, index: usize) -> usize {
        self.links(index).len()
    }

    /// Distinct neighbor indices, ascending. Parallel edges collapse.
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let links = self.links(index);
        links
            .iter()
            .enumerate()
            .filter(move |(position, link)| {
                *position == 0 || links[position - 1].neighbor != link.neighbor
            })
            .map(|(_, link)| link.neighbor)
    }

    pub fn count_by_type(&self, node_type: NodeType) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.node_type == node_type)
            .count()
    }

    pub fn count_by_connection(&self, connection: ConnectionType) -> usize {
        self.edges
            .iter()
            .filter(|edge| edge.connection == connection)
            .count()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeDetails {
    pub connection: ConnectionType,
    pub strength: Option<u8>,
    pub shared_book_ids: Vec<i64>,
    pub evidence: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

impl EdgeDetails {
    pub fn of(connection: ConnectionType) -> Self {
        Self {
            connection,
            strength: None,
            shared_book_ids: Vec::new(),
            evidence: None,
            start_year: None,
            end_year: None,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn node(id: &str, node_type: NodeType, name: &str) -> Node {
        Node {
            id: NodeId::new(id),
            node_type,
            name: name.to_owned(),
            book_count: 1,
            tier: None,
            era: None,
            birth_year: None,
            death_year: None,
            founded_year: None,
        }
    }

    pub fn author(id: &str, name: &str) -> Node {
        node(id, NodeType::Author, name)
    }

    pub fn link(
        id: &str,
        source: &str,
        target: &str,
        connection: ConnectionType,
    ) -> (EdgeId, NodeId, NodeId, EdgeDetails) {
        (
            EdgeId::new(id),
            NodeId::new(source),
            NodeId::new(target),
            EdgeDetails::of(connection),
        )
    }

    /// `n` authors named `a000..`, connected as a simple chain.
    pub fn chain(n: usize) -> SocialGraph {
        let nodes = (0..n)
            .map(|i| author(&format!("a{i:03}"), &format!("Author {i:03}")))
            .collect::<Vec<_>>();
        let edges = (1..n)
            .map(|i| {
                link(
                    &format!("e{i:03}"),
                    &format!("a{:03}", i - 1),
                    &format!("a{i:03}"),
                    ConnectionType::Friendship,
                )
            })
            .collect::<Vec<_>>();
        SocialGraph::from_records(nodes, edges, GraphMeta::default())
    }

    /// A star of `n` nodes: `hub` plus spokes `s000..`, with spoke pairs also
    /// linked to each other so degrees differ.
    pub fn star(n: usize) -> SocialGraph {
        let mut nodes = vec![node("hub", NodeType::Publisher, "Hub Press")];
        let mut edges = Vec::new();
        for i in 0..n.saturating_sub(1) {
            let id = format!("s{i:03}");
            nodes.push(author(&id, &format!("Spoke {i:03}")));
            edges.push(link(
                &format!("h{i:03}"),
                "hub",
                &id,
                ConnectionType::Publisher,
            ));
            if i % 2 == 1 {
                edges.push(link(
                    &format!("p{i:03}"),
                    &format!("s{:03}", i - 1),
                    &id,
                    ConnectionType::Friendship,
                ));
            }
        }
        SocialGraph::from_records(nodes, edges, GraphMeta::default())
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn nodes_are_sorted_and_adjacency_is_symmetric() {
        let graph = SocialGraph::from_records(
            vec![author("c", "C"), author("a", "A"), author("b", "B")],
            vec![
                link("e1", "c", "a", ConnectionType::Family),
                link("e2", "b", "a", ConnectionType::Influence),
            ],
            GraphMeta::default(),
        );

        let ids = graph.nodes.iter().map(|n| n.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let a = graph.index_of(&NodeId::new("a")).unwrap();
        let c = graph.index_of(&NodeId::new("c")).unwrap();
        assert_eq!(graph.neighbors(a).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(graph.neighbors(c).collect::<Vec<_>>(), vec![a]);
    }

    #[test]
    fn parallel_edges_collapse_in_neighbors_but_not_degree() {
        let graph = SocialGraph::from_records(
            vec![author("a", "A"), author("b", "B")],
            vec![
                link("e1", "a", "b", ConnectionType::Family),
                link("e2", "a", "b", ConnectionType::Friendship),
            ],
            GraphMeta::default(),
        );

        assert_eq!(graph.degree(0), 2);
        assert_eq!(graph.neighbors(0).count(), 1);
    }

    #[test]
    fn self_loops_and_dangling_edges_are_dropped() {
        let graph = SocialGraph::from_records(
            vec![author("a", "A")],
            vec![
                link("loop", "a", "a", ConnectionType::Family),
                link("dangling", "a", "missing", ConnectionType::Family),
            ],
            GraphMeta::default(),
        );

        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.degree(0), 0);
    }

    #[test]
    fn lifespan_prefers_birth_and_death() {
        let mut node = author("a", "A");
        assert_eq!(node.lifespan(), None);
        node.founded_year = Some(1768);
        assert_eq!(node.lifespan().as_deref(), Some("founded 1768"));
        node.birth_year = Some(1812);
        node.death_year = Some(1870);
        assert_eq!(node.lifespan().as_deref(), Some("1812–1870"));
    }
}
