use std::collections::BTreeSet;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::model::{ConnectionType, Era, Link, Node, NodeType, SocialGraph};

pub fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// An empty set means "no restriction".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterState {
    pub show_authors: bool,
    pub show_publishers: bool,
    pub show_binders: bool,
    pub connection_types: BTreeSet<ConnectionType>,
    pub tier1_only: bool,
    pub eras: BTreeSet<Era>,
    pub search_query: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            show_authors: true,
            show_publishers: true,
            show_binders: true,
            connection_types: BTreeSet::new(),
            tier1_only: false,
            eras: BTreeSet::new(),
            search_query: String::new(),
        }
    }
}

impl FilterState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn type_enabled(&self, node_type: NodeType) -> bool {
        match node_type {
            NodeType::Author => self.show_authors,
            NodeType::Publisher => self.show_publishers,
            NodeType::Binder => self.show_binders,
        }
    }

    pub fn type_toggle(&mut self, node_type: NodeType) -> &mut bool {
        match node_type {
            NodeType::Author => &mut self.show_authors,
            NodeType::Publisher => &mut self.show_publishers,
            NodeType::Binder => &mut self.show_binders,
        }
    }

    pub fn connection_enabled(&self, connection: ConnectionType) -> bool {
        self.connection_types.is_empty() || self.connection_types.contains(&connection)
    }

    pub fn era_enabled(&self, era: Era) -> bool {
        self.eras.is_empty() || self.eras.contains(&era)
    }

    pub fn toggle_connection(&mut self, connection: ConnectionType) {
        toggle_in_set(&mut self.connection_types, &ConnectionType::ALL, connection);
    }

    pub fn toggle_era(&mut self, era: Era) {
        toggle_in_set(&mut self.eras, &Era::ALL, era);
    }

    fn node_visible(&self, node: &Node, matcher: &SkimMatcherV2, query: &str) -> bool {
        if !self.type_enabled(node.node_type) {
            return false;
        }
        if self.tier1_only && !node.is_tier1() {
            return false;
        }
        if !self.era_enabled(node.era.unwrap_or(Era::Unknown)) {
            return false;
        }
        query.is_empty() || fuzzy_match_score(matcher, &node.name, query).is_some()
    }

    pub fn apply(&self, graph: &SocialGraph) -> FilteredView {
        let matcher = SkimMatcherV2::default();
        let query = self.search_query.trim();

        let node_mask = graph
            .nodes
            .iter()
            .map(|node| self.node_visible(node, &matcher, query))
            .collect::<Vec<_>>();

        let edge_mask = graph
            .edges
            .iter()
            .map(|edge| {
                node_mask[edge.source]
                    && node_mask[edge.target]
                    && self.connection_enabled(edge.connection)
            })
            .collect::<Vec<_>>();

        FilteredView::from_masks(node_mask, edge_mask)
    }
}

// Unchecking from "all" keeps every other value; checking the last missing
// value goes back to the empty set.
fn toggle_in_set<T: Ord + Copy>(set: &mut BTreeSet<T>, all: &[T], value: T) {
    if set.is_empty() {
        set.extend(all.iter().copied().filter(|item| *item != value));
    } else if !set.remove(&value) {
        set.insert(value);
    }

    if all.iter().all(|item| set.contains(item)) {
        set.clear();
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilteredView {
    node_mask: Vec<bool>,
    edge_mask: Vec<bool>,
    node_count: usize,
    edge_count: usize,
}

impl FilteredView {
    fn from_masks(node_mask: Vec<bool>, edge_mask: Vec<bool>) -> Self {
        let node_count = node_mask.iter().filter(|visible| **visible).count();
        let edge_count = edge_mask.iter().filter(|visible| **visible).count();
        Self {
            node_mask,
            edge_mask,
            node_count,
            edge_count,
        }
    }

    pub fn all(graph: &SocialGraph) -> Self {
        Self::from_masks(vec![true; graph.node_count()], vec![true; graph.edge_count()])
    }

    pub fn contains_node(&self, index: usize) -> bool {
        self.node_mask.get(index).copied().unwrap_or(false)
    }

    pub fn contains_edge(&self, index: usize) -> bool {
        self.edge_mask.get(index).copied().unwrap_or(false)
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn node_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.node_mask
            .iter()
            .enumerate()
            .filter_map(|(index, visible)| visible.then_some(index))
    }

    pub fn edge_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.edge_mask
            .iter()
            .enumerate()
            .filter_map(|(index, visible)| visible.then_some(index))
    }

    pub fn links<'a>(
        &'a self,
        graph: &'a SocialGraph,
        index: usize,
    ) -> impl Iterator<Item = Link> + 'a {
        graph
            .links(index)
            .iter()
            .copied()
            .filter(|link| self.contains_edge(link.edge))
    }

    pub fn neighbors<'a>(
        &'a self,
        graph: &'a SocialGraph,
        index: usize,
    ) -> impl Iterator<Item = usize> + 'a {
        let mut previous = None;
        self.links(graph, index).filter_map(move |link| {
            if previous == Some(link.neighbor) {
                None
            } else {
                previous = Some(link.neighbor);
                Some(link.neighbor)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::super::model::fixtures::*;
    use super::super::model::{EdgeId, GraphMeta, NodeId};
    use super::*;

    fn sample() -> SocialGraph {
        let mut dickens = author("author:1", "Charles Dickens");
        dickens.tier = Some(1);
        dickens.era = Some(Era::Victorian);
        let mut shelley = author("author:2", "Mary Shelley");
        shelley.era = Some(Era::Romantic);
        let mut chapman = node("publisher:1", NodeType::Publisher, "Chapman & Hall");
        chapman.tier = Some(1);
        let riviere = node("binder:1", NodeType::Binder, "Riviere & Son");

        SocialGraph::from_records(
            vec![dickens, shelley, chapman, riviere],
            vec![
                link("e1", "author:1", "publisher:1", ConnectionType::Publisher),
                link("e2", "author:1", "binder:1", ConnectionType::Binder),
                link("e3", "author:1", "author:2", ConnectionType::Influence),
                link("e4", "author:2", "publisher:1", ConnectionType::Publisher),
            ],
            GraphMeta::default(),
        )
    }

    fn visible_names(graph: &SocialGraph, view: &FilteredView) -> Vec<String> {
        view.node_indices()
            .map(|index| graph.nodes[index].name.clone())
            .collect()
    }

    #[test]
    fn default_filter_shows_everything() {
        let graph = sample();
        let view = FilterState::default().apply(&graph);
        assert_eq!(view, FilteredView::all(&graph));
    }

    #[test]
    fn hiding_a_type_drops_its_edges() {
        let graph = sample();
        let filter = FilterState {
            show_binders: false,
            ..FilterState::default()
        };
        let view = filter.apply(&graph);

        assert_eq!(view.node_count(), 3);
        assert_eq!(view.edge_count(), 3);
        let binder_edge = graph.edge_index_of(&EdgeId::new("e2")).unwrap();
        assert!(!view.contains_edge(binder_edge));
    }

    #[test]
    fn connection_types_restrict_edges_only() {
        let graph = sample();
        let filter = FilterState {
            connection_types: BTreeSet::from([ConnectionType::Influence]),
            ..FilterState::default()
        };
        let view = filter.apply(&graph);

        assert_eq!(view.node_count(), 4);
        assert_eq!(view.edge_count(), 1);
    }

    #[test]
    fn toggling_from_all_keeps_the_rest() {
        let mut filter = FilterState::default();
        filter.toggle_connection(ConnectionType::Scandal);
        assert_eq!(filter.connection_types.len(), ConnectionType::ALL.len() - 1);
        assert!(!filter.connection_enabled(ConnectionType::Scandal));
        assert!(filter.connection_enabled(ConnectionType::Family));

        filter.toggle_connection(ConnectionType::Scandal);
        assert!(filter.connection_types.is_empty());
        assert!(filter.is_default());

        filter.toggle_era(Era::Victorian);
        assert!(!filter.era_enabled(Era::Victorian));
        assert!(filter.era_enabled(Era::Romantic));
    }

    #[test]
    fn tier_and_era_combine() {
        let graph = sample();
        let filter = FilterState {
            tier1_only: true,
            eras: BTreeSet::from([Era::Victorian]),
            ..FilterState::default()
        };
        assert_eq!(
            visible_names(&graph, &filter.apply(&graph)),
            vec!["Charles Dickens"]
        );
    }

    #[test]
    fn era_less_entities_count_as_unknown() {
        let graph = sample();
        let mut filter = FilterState::default();
        filter.toggle_era(Era::Romantic);
        assert!(filter.era_enabled(Era::Unknown));
        assert_eq!(
            visible_names(&graph, &filter.apply(&graph)),
            vec!["Charles Dickens", "Riviere & Son", "Chapman & Hall"]
        );

        filter.toggle_era(Era::Unknown);
        assert_eq!(
            visible_names(&graph, &filter.apply(&graph)),
            vec!["Charles Dickens"]
        );
    }

    #[test]
    fn search_is_fuzzy_and_case_insensitive() {
        let graph = sample();
        let filter = FilterState {
            search_query: "  DICKNS ".to_owned(),
            ..FilterState::default()
        };
        assert_eq!(
            visible_names(&graph, &filter.apply(&graph)),
            vec!["Charles Dickens"]
        );
    }

    #[test]
    fn filtered_neighbors_skip_hidden_edges() {
        let graph = sample();
        let filter = FilterState {
            connection_types: BTreeSet::from([ConnectionType::Publisher]),
            ..FilterState::default()
        };
        let view = filter.apply(&graph);
        let dickens = graph.index_of(&NodeId::new("author:1")).unwrap();
        let publisher = graph.index_of(&NodeId::new("publisher:1")).unwrap();

        assert_eq!(
            view.neighbors(&graph, dickens).collect::<Vec<_>>(),
            vec![publisher]
        );
    }

    #[test]
    fn reset_restores_everything_at_once() {
        let mut filter = FilterState {
            show_authors: false,
            connection_types: BTreeSet::from([ConnectionType::Scandal]),
            tier1_only: true,
            ..FilterState::default()
        };
        filter.reset();

        assert_eq!(
            filter,
            FilterState {
                show_authors: true,
                show_publishers: true,
                show_binders: true,
                connection_types: BTreeSet::new(),
                tier1_only: false,
                eras: BTreeSet::new(),
                search_query: String::new(),
            }
        );
        assert!(filter.is_default());
    }

    fn arb_filter() -> impl Strategy<Value = FilterState> {
        (
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            proptest::sample::subsequence(ConnectionType::ALL.to_vec(), 0..=3),
            any::<bool>(),
            proptest::sample::subsequence(Era::ALL.to_vec(), 0..=2),
            "[a-z]{0,3}",
        )
            .prop_map(
                |(authors, publishers, binders, types, tier1, eras, query)| FilterState {
                    show_authors: authors,
                    show_publishers: publishers,
                    show_binders: binders,
                    connection_types: types.into_iter().collect(),
                    tier1_only: tier1,
                    eras: eras.into_iter().collect(),
                    search_query: query,
                },
            )
    }

    proptest! {
        #[test]
        fn applying_twice_is_identical(filter in arb_filter()) {
            let graph = sample();
            prop_assert_eq!(filter.apply(&graph), filter.apply(&graph));
        }

        #[test]
        fn visible_edges_have_visible_endpoints(filter in arb_filter()) {
            let graph = sample();
            let view = filter.apply(&graph);
            for index in view.edge_indices() {
                let edge = &graph.edges[index];
                prop_assert!(view.contains_node(edge.source));
                prop_assert!(view.contains_node(edge.target));
                prop_assert!(filter.connection_enabled(edge.connection));
            }
        }
    }
}
