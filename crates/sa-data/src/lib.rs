//! Data sources and configuration for the analytics dashboard

pub mod config;
pub mod schema;
pub mod sources;

use thiserror::Error;

// Re-exports
pub use config::{DashboardConfig, RateLimitConfig, SourceConfig};
pub use schema::WireSnapshot;
pub use sources::MockSource;

/// Errors that can occur while loading data or configuration
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate post {id} on {platform}")]
    DuplicatePost { platform: String, id: u64 },

    #[error("Invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}
