use tracing::{debug, info, warn};

use crate::circles::{
    HubView, NodeId, PathQuery, PathQueryError, PathResult, PathScope, scoped_path,
};

use super::super::ViewModel;
use super::super::scene::{GraphHandle, SyncOutcome};

impl ViewModel {
    /// Recomputes filter and hub views and reconciles the scene. Runs at most
    /// once per frame, and only after something marked the graph dirty.
    pub(in crate::app) fn refresh_scene(&mut self) {
        if !self.graph_dirty {
            return;
        }

        self.filtered = self.filter.apply(&self.graph);
        self.hub
            .normalize(self.config.budget, self.filtered.node_count());
        self.hub_view = HubView::compute(
            &self.graph,
            &self.filtered,
            &self.ranking,
            &self.hub,
            self.config.budget,
        );

        let outcome = self
            .scene
            .sync(&self.graph, &self.filtered, &self.hub_view);
        debug!(
            filtered_nodes = self.filtered.node_count(),
            filtered_edges = self.filtered.edge_count(),
            visible_nodes = self.hub_view.visible_count(),
            level = self.hub.level.label(),
            rebuilt = outcome == SyncOutcome::Rebuilt,
            "graph recomputed"
        );

        if outcome == SyncOutcome::Rebuilt && self.path_scope == PathScope::Visible {
            self.path_result = PathResult::NotSearched;
        }

        if let Some(id) = self.pending_selection.take()
            && self.scene.select_node(&id)
        {
            self.popup = Some(id);
        }
        if self
            .popup
            .as_ref()
            .is_some_and(|id| !self.scene.contains_node(id))
        {
            self.popup = None;
        }

        self.graph_dirty = false;
    }

    /// Makes a filtered node visible by expanding it, then selects it once
    /// the scene has caught up. Returns `false` if filters hide the node.
    pub(in crate::app) fn reveal_node(&mut self, id: &NodeId) -> bool {
        let Some(index) = self.graph.index_of(id) else {
            return false;
        };
        if !self.filtered.contains_node(index) {
            return false;
        }

        if !self.hub_view.contains(index) {
            self.hub.expand(id);
        }
        self.pending_selection = Some(id.clone());
        self.graph_dirty = true;
        true
    }

    pub(in crate::app) fn expand_node(&mut self, id: &NodeId) {
        let Some(index) = self.graph.index_of(id) else {
            return;
        };
        if self.hub_view.hidden_count(index) > 0 && self.hub.expand(id) {
            debug!(node = %id, "expanded hub node");
            self.graph_dirty = true;
        }
    }

    /// Path nodes that filters allow but the hub level keeps hidden.
    pub(in crate::app) fn hidden_path_nodes(&self) -> Vec<NodeId> {
        let PathResult::Found { nodes, .. } = &self.path_result else {
            return Vec::new();
        };
        nodes
            .iter()
            .filter(|id| {
                self.graph.index_of(id).is_some_and(|index| {
                    self.filtered.contains_node(index) && !self.hub_view.contains(index)
                })
            })
            .cloned()
            .collect()
    }

    pub(in crate::app) fn reveal_path(&mut self) {
        for id in self.hidden_path_nodes() {
            self.hub.expand(&id);
            self.graph_dirty = true;
        }
    }

    pub(in crate::app) fn path_query(&self) -> Result<PathQuery, PathQueryError> {
        match (&self.path_start, &self.path_end) {
            (Some(start), Some(end)) => PathQuery::new(&self.graph, start, end),
            _ => Err(PathQueryError::MissingEndpoint),
        }
    }

    pub(in crate::app) fn run_path_search(&mut self) -> Result<(), PathQueryError> {
        let query = self.path_query()?;
        self.path_result = scoped_path(
            &self.graph,
            &query,
            self.path_scope,
            &self.filtered,
            &self.hub_view,
        );
        info!(
            scope = self.path_scope.label(),
            degrees = ?self.path_result.degrees(),
            "path search"
        );
        Ok(())
    }

    /// Runs the search behind the "Find path" button; a rejected query is
    /// logged and leaves the previous result alone.
    pub(in crate::app) fn find_path_clicked(&mut self) -> bool {
        match self.run_path_search() {
            Ok(()) => true,
            Err(error) => {
                warn!(%error, "path search rejected");
                false
            }
        }
    }

    pub(in crate::app) fn clear_path(&mut self) {
        self.path_start = None;
        self.path_end = None;
        self.path_result = PathResult::NotSearched;
    }

    pub(in crate::app) fn reset_filters(&mut self) {
        self.filter.reset();
        self.search_input.clear();
        self.search.cancel();
        self.graph_dirty = true;
    }

    pub(in crate::app) fn collapse_hub(&mut self) {
        self.hub
            .collapse(self.config.budget, self.filtered.node_count());
        self.graph_dirty = true;
    }

    pub(in crate::app) fn poll_search(&mut self, now: f64) -> Option<f64> {
        if let Some(query) = self.search.poll(now)
            && query != self.filter.search_query
        {
            debug!(query = %query, "search applied");
            self.filter.search_query = query;
            self.graph_dirty = true;
        }
        self.search.remaining(now)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::circles::fixtures::star;
    use crate::circles::{DataSource, HubLevel};
    use crate::config::ExplorerConfig;

    use super::*;

    fn model(n: usize) -> ViewModel {
        let mut model = ViewModel::new(star(n), ExplorerConfig::new(DataSource::Stdin));
        model.refresh_scene();
        model
    }

    #[test]
    fn starts_compact_and_reveals_hidden_nodes() {
        let mut model = model(60);
        assert_eq!(model.hub.level, HubLevel::Compact);
        assert_eq!(model.scene.stats().node_count, 25);

        let hidden = model
            .graph
            .nodes
            .iter()
            .map(|node| node.id.clone())
            .find(|id| !model.scene.contains_node(id))
            .unwrap();
        assert!(model.reveal_node(&hidden));
        model.refresh_scene();

        assert!(model.scene.contains_node(&hidden));
        assert_eq!(model.scene.selected_node(), Some(&hidden));
        assert_eq!(model.popup.as_ref(), Some(&hidden));
        assert_eq!(model.hub.level, HubLevel::Compact);
    }

    #[test]
    fn debounced_search_filters_after_quiet_period() {
        let mut model = model(10);
        model.search.submit("Hub".to_owned(), 0.0);
        model.poll_search(0.1);
        model.refresh_scene();
        assert_eq!(model.filtered.node_count(), 10);

        model.poll_search(0.5);
        model.refresh_scene();
        assert_eq!(model.filter.search_query, "Hub");
        assert_eq!(model.filtered.node_count(), 1);
    }

    #[test]
    fn reset_restores_every_filter() {
        let mut model = model(10);
        model.filter.show_authors = false;
        model.search_input = "Hub".to_owned();
        model.filter.search_query = "Hub".to_owned();
        model.graph_dirty = true;
        model.refresh_scene();
        assert_eq!(model.filtered.node_count(), 1);

        model.reset_filters();
        model.refresh_scene();
        assert!(model.filter.is_default());
        assert!(model.search_input.is_empty());
        assert_eq!(model.filtered.node_count(), 10);
    }

    #[test]
    fn path_search_validates_then_finds() {
        let mut model = model(10);
        assert_eq!(model.run_path_search(), Err(PathQueryError::MissingEndpoint));

        model.path_start = Some(NodeId::new("s000"));
        model.path_end = Some(NodeId::new("s000"));
        assert_eq!(model.run_path_search(), Err(PathQueryError::SameEndpoints));
        assert_eq!(model.path_result, PathResult::NotSearched);

        model.path_end = Some(NodeId::new("s004"));
        assert_eq!(model.run_path_search(), Ok(()));
        assert_eq!(model.path_result.degrees(), Some(2));

        model.clear_path();
        assert_eq!(model.path_result, PathResult::NotSearched);
        assert_eq!(model.path_start, None);
    }

    #[test]
    fn rejected_path_click_keeps_previous_result() {
        let mut model = model(10);
        model.path_start = Some(NodeId::new("s001"));
        model.path_end = Some(NodeId::new("s002"));
        assert!(model.find_path_clicked());
        let found = model.path_result.clone();
        assert_eq!(found.degrees(), Some(2));

        model.path_end = Some(NodeId::new("s001"));
        assert!(!model.find_path_clicked());
        assert_eq!(model.path_result, found);
    }

    #[test]
    fn hidden_by_filter_cannot_be_revealed() {
        let mut model = model(10);
        model.filter.show_publishers = false;
        model.graph_dirty = true;
        model.refresh_scene();
        assert!(!model.reveal_node(&NodeId::new("hub")));
    }
}
