//! Core functionality for the social media analytics dashboard
//!
//! This crate provides the data model, the state tree with its request
//! lifecycle, and the plumbing that moves data from a source into the store.

pub mod dispatch;
pub mod events;
pub mod gateway;
pub mod model;
pub mod rate_limit;
pub mod state;
pub mod store;

// Re-export commonly used types
pub use data::{DataSource, SourceError};
pub use dispatch::{Dispatcher, FetchTicket};
pub use gateway::{FetchEnvelope, FetchGateway, HistoricalPayload, PlatformPayload};
pub use model::{
    HistoricalPoint, MetricsSnapshot, ModelError, PlatformFilter, PlatformId, PlatformStats,
    Post, PostKey, PostStatus, TimeRange,
};
pub use rate_limit::{Clock, ManualClock, RateLimiter, Schedule, SystemClock};
pub use state::{
    Action, Applied, FilterState, FilterUpdate, RequestClass, RequestId, RequestState, StateTree,
};
pub use store::Store;

pub mod data {
    use thiserror::Error;

    use crate::model::{HistoricalPoint, MetricsSnapshot, PlatformId, PlatformStats, TimeRange};

    /// Failures a data source can report
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum SourceError {
        #[error("Platform {platform} not found")]
        NotFound { platform: String },

        #[error("Transport error: {0}")]
        Transport(String),

        #[error("Request cancelled")]
        Cancelled,
    }

    /// Trait for providers of social media metrics
    ///
    /// Every call is a side-effect-free read. Implementations may take time
    /// to resolve and may fail; retries are the caller's decision.
    #[async_trait::async_trait]
    pub trait DataSource: Send + Sync {
        /// Fetch the complete metrics snapshot
        async fn fetch_all(&self) -> Result<MetricsSnapshot, SourceError>;

        /// Fetch the counters of a single platform
        async fn fetch_platform(&self, platform: PlatformId) -> Result<PlatformStats, SourceError>;

        /// Fetch the historical series for a time range, in chronological order
        async fn fetch_historical(&self, range: TimeRange) -> Result<Vec<HistoricalPoint>, SourceError>;

        /// Get the source name
        fn source_name(&self) -> &str;
    }
}
