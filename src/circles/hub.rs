use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::filter::FilteredView;
use super::model::{NodeId, SocialGraph};

pub const DEFAULT_COMPACT_BUDGET: usize = 25;
pub const DEFAULT_MEDIUM_BUDGET: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HubLevel {
    Compact,
    Medium,
    Full,
}

impl HubLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Compact => "Compact",
            Self::Medium => "Medium",
            Self::Full => "Full",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HubBudget {
    compact: usize,
    medium: usize,
}

impl Default for HubBudget {
    fn default() -> Self {
        Self::new(DEFAULT_COMPACT_BUDGET, DEFAULT_MEDIUM_BUDGET)
    }
}

impl HubBudget {
    pub fn new(compact: usize, medium: usize) -> Self {
        let compact = compact.max(1);
        Self {
            compact,
            medium: medium.max(compact),
        }
    }

    pub fn limit(self, level: HubLevel) -> Option<usize> {
        match level {
            HubLevel::Compact => Some(self.compact),
            HubLevel::Medium => Some(self.medium),
            HubLevel::Full => None,
        }
    }

    /// Levels that show something different for a graph of `node_count`
    /// nodes. A reduced level is only offered while its budget is smaller
    /// than the graph; `Full` is always offered.
    pub fn available_levels(self, node_count: usize) -> Vec<HubLevel> {
        let mut levels = Vec::with_capacity(3);
        if self.compact < node_count {
            levels.push(HubLevel::Compact);
        }
        if self.medium < node_count && self.medium > self.compact {
            levels.push(HubLevel::Medium);
        }
        levels.push(HubLevel::Full);
        levels
    }
}

/// `expanded` survives level changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HubState {
    pub level: HubLevel,
    pub expanded: BTreeSet<NodeId>,
}

impl HubState {
    pub fn new(budget: HubBudget, node_count: usize) -> Self {
        Self {
            level: budget.available_levels(node_count)[0],
            expanded: BTreeSet::new(),
        }
    }

    pub fn can_show_more(&self, budget: HubBudget, node_count: usize) -> bool {
        self.next_level(budget, node_count).is_some()
    }

    pub fn can_show_less(&self, budget: HubBudget, node_count: usize) -> bool {
        self.previous_level(budget, node_count).is_some()
    }

    fn next_level(&self, budget: HubBudget, node_count: usize) -> Option<HubLevel> {
        budget
            .available_levels(node_count)
            .into_iter()
            .find(|level| *level > self.level)
    }

    fn previous_level(&self, budget: HubBudget, node_count: usize) -> Option<HubLevel> {
        budget
            .available_levels(node_count)
            .into_iter()
            .rev()
            .find(|level| *level < self.level)
    }

    pub fn show_more(&mut self, budget: HubBudget, node_count: usize) -> bool {
        match self.next_level(budget, node_count) {
            Some(level) => {
                self.level = level;
                true
            }
            None => false,
        }
    }

    pub fn show_less(&mut self, budget: HubBudget, node_count: usize) -> bool {
        match self.previous_level(budget, node_count) {
            Some(level) => {
                self.level = level;
                true
            }
            None => false,
        }
    }

    /// Moves to the nearest available level at or above the current one, used
    /// after a filter change shrinks or grows the graph.
    pub fn normalize(&mut self, budget: HubBudget, node_count: usize) {
        let levels = budget.available_levels(node_count);
        if !levels.contains(&self.level) {
            self.level = levels
                .iter()
                .copied()
                .find(|level| *level > self.level)
                .unwrap_or(HubLevel::Full);
        }
    }

    pub fn expand(&mut self, id: &NodeId) -> bool {
        self.expanded.insert(id.clone())
    }

    pub fn collapse(&mut self, budget: HubBudget, node_count: usize) {
        *self = Self::new(budget, node_count);
    }
}

fn rank_order(graph: &SocialGraph, a: usize, b: usize) -> Ordering {
    let a_node = &graph.nodes[a];
    let b_node = &graph.nodes[b];
    graph
        .degree(b)
        .cmp(&graph.degree(a))
        .then_with(|| {
            let a_tier = a_node.tier.unwrap_or(u8::MAX);
            let b_tier = b_node.tier.unwrap_or(u8::MAX);
            a_tier.cmp(&b_tier)
        })
        .then_with(|| a_node.name.cmp(&b_node.name))
        .then_with(|| a_node.id.cmp(&b_node.id))
}

/// Node indices ordered by importance: full-graph degree, then tier, then name.
pub fn rank_nodes(graph: &SocialGraph) -> Vec<usize> {
    let mut ranking = (0..graph.node_count()).collect::<Vec<_>>();
    ranking.sort_by(|a, b| rank_order(graph, *a, *b));
    ranking
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HubView {
    pub level: HubLevel,
    visible: Vec<bool>,
    hidden_counts: Vec<usize>,
    visible_count: usize,
}

impl HubView {
    pub fn compute(
        graph: &SocialGraph,
        filtered: &FilteredView,
        ranking: &[usize],
        state: &HubState,
        budget: HubBudget,
    ) -> Self {
        let node_count = graph.node_count();
        let mut visible = vec![false; node_count];

        match budget.limit(state.level) {
            None => {
                for index in filtered.node_indices() {
                    visible[index] = true;
                }
            }
            Some(limit) => {
                for &index in ranking
                    .iter()
                    .filter(|index| filtered.contains_node(**index))
                    .take(limit)
                {
                    visible[index] = true;
                }

                for id in &state.expanded {
                    let Some(index) = graph.index_of(id) else {
                        continue;
                    };
                    if !filtered.contains_node(index) {
                        continue;
                    }

                    visible[index] = true;
                    for neighbor in filtered.neighbors(graph, index) {
                        visible[neighbor] = true;
                    }
                }
            }
        }

        let mut hidden_counts = vec![0; node_count];
        let mut visible_count = 0;
        for index in 0..node_count {
            if !visible[index] {
                continue;
            }
            visible_count += 1;
            hidden_counts[index] = filtered
                .neighbors(graph, index)
                .filter(|neighbor| !visible[*neighbor])
                .count();
        }

        Self {
            level: state.level,
            visible,
            hidden_counts,
            visible_count,
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.visible.get(index).copied().unwrap_or(false)
    }

    pub fn hidden_count(&self, index: usize) -> usize {
        self.hidden_counts.get(index).copied().unwrap_or(0)
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn node_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.visible
            .iter()
            .enumerate()
            .filter_map(|(index, visible)| visible.then_some(index))
    }

    pub fn edge_indices<'a>(
        &'a self,
        graph: &'a SocialGraph,
        filtered: &'a FilteredView,
    ) -> impl Iterator<Item = usize> + 'a {
        filtered.edge_indices().filter(move |index| {
            let edge = &graph.edges[*index];
            self.contains(edge.source) && self.contains(edge.target)
        })
    }

    pub fn total_hidden(&self, filtered: &FilteredView) -> usize {
        filtered.node_count().saturating_sub(self.visible_count)
    }

    /// Hidden filtered nodes with no disclosed neighbor; no single expand
    /// click can reach them.
    pub fn unreachable_hidden(&self, graph: &SocialGraph, filtered: &FilteredView) -> Vec<usize> {
        filtered
            .node_indices()
            .filter(|index| !self.contains(*index))
            .filter(|index| {
                !filtered
                    .neighbors(graph, *index)
                    .any(|neighbor| self.contains(neighbor))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::super::model::fixtures::*;
    use super::*;

    fn view(graph: &SocialGraph, state: &HubState, budget: HubBudget) -> HubView {
        let filtered = FilteredView::all(graph);
        HubView::compute(graph, &filtered, &rank_nodes(graph), state, budget)
    }

    fn visible_set(view: &HubView) -> BTreeSet<usize> {
        view.node_indices().collect()
    }

    #[test]
    fn compact_reduction_on_two_hundred_nodes() {
        let graph = star(200);
        let budget = HubBudget::default();
        let state = HubState::new(budget, graph.node_count());
        assert_eq!(state.level, HubLevel::Compact);

        let hub_view = view(&graph, &state, budget);
        assert_eq!(hub_view.visible_count(), 25);

        let filtered = FilteredView::all(&graph);
        assert!(hub_view.unreachable_hidden(&graph, &filtered).is_empty());
        assert_eq!(hub_view.total_hidden(&filtered), 175);
    }

    #[test]
    fn hub_ranks_first() {
        let graph = star(10);
        let ranking = rank_nodes(&graph);
        assert_eq!(graph.nodes[ranking[0]].id.as_str(), "hub");
    }

    #[test]
    fn ranking_ties_break_on_tier_then_name() {
        let mut b = author("b", "Beta");
        b.tier = Some(1);
        let graph = SocialGraph::from_records(
            vec![author("a", "Alpha"), b, author("c", "Aardvark")],
            Vec::new(),
            Default::default(),
        );
        let names = rank_nodes(&graph)
            .into_iter()
            .map(|index| graph.nodes[index].name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Beta", "Aardvark", "Alpha"]);
    }

    #[test]
    fn full_level_has_no_badges() {
        let graph = star(80);
        let budget = HubBudget::default();
        let state = HubState {
            level: HubLevel::Full,
            expanded: BTreeSet::new(),
        };
        let hub_view = view(&graph, &state, budget);

        assert_eq!(hub_view.visible_count(), 80);
        for index in hub_view.node_indices() {
            assert_eq!(hub_view.hidden_count(index), 0);
        }
    }

    #[test]
    fn expand_then_full_shows_everything() {
        let graph = chain(200);
        let budget = HubBudget::default();
        let mut state = HubState::new(budget, graph.node_count());

        let before = view(&graph, &state, budget);
        let badged = before
            .node_indices()
            .find(|index| before.hidden_count(*index) > 0)
            .unwrap();
        assert!(state.expand(&graph.nodes[badged].id));

        let expanded = view(&graph, &state, budget);
        assert_eq!(
            expanded.visible_count(),
            before.visible_count() + before.hidden_count(badged)
        );
        assert_eq!(expanded.hidden_count(badged), 0);

        while state.show_more(budget, graph.node_count()) {}
        assert_eq!(state.level, HubLevel::Full);

        let full = view(&graph, &state, budget);
        assert_eq!(full.visible_count(), 200);
        assert!(full.node_indices().all(|index| full.hidden_count(index) == 0));
    }

    #[test]
    fn level_cycle_preserves_expanded() {
        let graph = star(120);
        let budget = HubBudget::default();
        let node_count = graph.node_count();
        let mut state = HubState::new(budget, node_count);
        state.expand(&graph.nodes[0].id);

        assert!(state.show_more(budget, node_count));
        assert_eq!(state.level, HubLevel::Medium);
        assert!(state.show_more(budget, node_count));
        assert_eq!(state.level, HubLevel::Full);
        assert!(!state.can_show_more(budget, node_count));
        assert!(!state.show_more(budget, node_count));

        assert!(state.show_less(budget, node_count));
        assert_eq!(state.level, HubLevel::Medium);
        assert_eq!(state.expanded.len(), 1);
    }

    #[test]
    fn small_graph_collapses_to_full() {
        let graph = chain(20);
        let budget = HubBudget::default();
        let state = HubState::new(budget, graph.node_count());

        assert_eq!(budget.available_levels(20), vec![HubLevel::Full]);
        assert_eq!(state.level, HubLevel::Full);
        assert!(!state.can_show_more(budget, 20));
        assert!(!state.can_show_less(budget, 20));
    }

    #[test]
    fn medium_is_skipped_when_it_would_show_everything() {
        let budget = HubBudget::default();
        assert_eq!(
            budget.available_levels(40),
            vec![HubLevel::Compact, HubLevel::Full]
        );
        assert_eq!(
            budget.available_levels(51),
            vec![HubLevel::Compact, HubLevel::Medium, HubLevel::Full]
        );
    }

    #[test]
    fn normalize_moves_up_when_level_disappears() {
        let budget = HubBudget::default();
        let mut state = HubState::new(budget, 100);
        assert!(state.show_more(budget, 100));
        assert_eq!(state.level, HubLevel::Medium);

        state.normalize(budget, 30);
        assert_eq!(state.level, HubLevel::Full);
    }

    #[test]
    fn compute_is_pure() {
        let graph = chain(90);
        let budget = HubBudget::default();
        let mut state = HubState::new(budget, graph.node_count());
        state.expand(&graph.nodes[60].id);
        assert_eq!(view(&graph, &state, budget), view(&graph, &state, budget));
    }

    proptest! {
        #[test]
        fn expansion_only_grows_visible_set(
            first in proptest::collection::btree_set(0usize..150, 0..6),
            second in proptest::collection::btree_set(0usize..150, 0..6),
            medium in any::<bool>(),
        ) {
            let graph = star(150);
            let budget = HubBudget::default();
            let level = if medium { HubLevel::Medium } else { HubLevel::Compact };
            let ids = |set: &BTreeSet<usize>| {
                set.iter().map(|index| graph.nodes[*index].id.clone()).collect::<BTreeSet<_>>()
            };

            let narrow = HubState { level, expanded: ids(&first) };
            let mut wide = narrow.clone();
            wide.expanded.extend(ids(&second));

            let narrow_visible = visible_set(&view(&graph, &narrow, budget));
            let wide_visible = visible_set(&view(&graph, &wide, budget));
            prop_assert!(narrow_visible.is_subset(&wide_visible));
        }
    }
}
