mod debounce;
mod filter;
mod hub;
mod load;
mod model;
mod parse;
mod path;

pub use debounce::{DEFAULT_SEARCH_DEBOUNCE, Debounced};
pub use filter::{FilterState, FilteredView, fuzzy_match_score};
pub use hub::{
    DEFAULT_COMPACT_BUDGET, DEFAULT_MEDIUM_BUDGET, HubBudget, HubLevel, HubState, HubView,
    rank_nodes,
};
pub use load::{DataSource, load_social_graph};
pub use model::{ConnectionType, EdgeId, Era, Node, NodeId, NodeType, SocialGraph};
pub use path::{PathQuery, PathQueryError, PathResult, PathScope, scoped_path};

#[cfg(test)]
pub(crate) use model::fixtures;
