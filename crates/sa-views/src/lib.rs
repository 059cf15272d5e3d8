//! Display projections for the analytics dashboard
//!
//! Pure derivations over the state tree: the posts table pipeline and the
//! chart series. Nothing here mutates the store.

pub mod charts;
pub mod posts;

pub use charts::{
    engagement_series, platform_distribution, stat_cards, DistributionSlice, EngagementChart,
    Series, StatCard, Trend,
};
pub use posts::{
    filter_platform, filter_search, project_posts, sort_posts, PostQuery, PostsProjection,
    PostsView, SortConfig, SortDirection, SortKey,
};
