use std::time::Duration;

use crate::app::LayoutMode;
use crate::circles::{DataSource, HubBudget, PathScope};

#[derive(Clone, Debug)]
pub struct ExplorerConfig {
    pub data: DataSource,
    pub budget: HubBudget,
    pub search_debounce: Duration,
    pub path_scope: PathScope,
    pub layout: LayoutMode,
}

impl ExplorerConfig {
    pub fn new(data: DataSource) -> Self {
        Self {
            data,
            budget: HubBudget::default(),
            search_debounce: crate::circles::DEFAULT_SEARCH_DEBOUNCE,
            path_scope: PathScope::default(),
            layout: LayoutMode::default(),
        }
    }

    pub fn with_budget(mut self, compact: usize, medium: usize) -> Self {
        self.budget = HubBudget::new(compact, medium);
        self
    }

    pub fn with_search_debounce(mut self, millis: u64) -> Self {
        self.search_debounce = Duration::from_millis(millis);
        self
    }

    pub fn with_path_scope(mut self, scope: PathScope) -> Self {
        self.path_scope = scope;
        self
    }

    pub fn with_layout(mut self, layout: LayoutMode) -> Self {
        self.layout = layout;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::circles::HubLevel;

    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = ExplorerConfig::new(DataSource::from_arg("circles.json"))
            .with_budget(10, 4)
            .with_search_debounce(120)
            .with_path_scope(PathScope::Visible)
            .with_layout(LayoutMode::Grid);

        assert_eq!(config.data, DataSource::File(PathBuf::from("circles.json")));
        assert_eq!(config.budget.limit(HubLevel::Compact), Some(10));
        assert_eq!(config.budget.limit(HubLevel::Medium), Some(10));
        assert_eq!(config.search_debounce, Duration::from_millis(120));
        assert_eq!(config.path_scope, PathScope::Visible);
        assert_eq!(config.layout, LayoutMode::Grid);
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let config = ExplorerConfig::new(DataSource::Stdin);
        assert_eq!(config.budget.limit(HubLevel::Compact), Some(25));
        assert_eq!(config.budget.limit(HubLevel::Medium), Some(50));
        assert_eq!(config.search_debounce, Duration::from_millis(300));
        assert_eq!(config.path_scope, PathScope::Full);
        assert_eq!(config.layout, LayoutMode::Force);
    }
}
