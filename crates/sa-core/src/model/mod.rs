//! Social media metrics data model
//!
//! These are the shapes produced by a data source and held in the state
//! tree. Everything here is plain data; mutation happens only through the
//! reducer in [`crate::state`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod platform;

pub use platform::{PlatformFilter, PlatformId};

/// Errors raised when parsing model values from strings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Platform {0} not found")]
    UnknownPlatform(String),

    #[error("Unknown time range: {0}")]
    UnknownTimeRange(String),

    #[error("Unknown post status: {0}")]
    UnknownStatus(String),

    #[error("Unknown sort key: {0}")]
    UnknownSortKey(String),
}

/// Time window selectable for historical charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "7days")]
    Last7Days,
    #[default]
    #[serde(rename = "30days")]
    Last30Days,
    #[serde(rename = "90days")]
    Last90Days,
    #[serde(rename = "1year")]
    LastYear,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::Last7Days,
        TimeRange::Last30Days,
        TimeRange::Last90Days,
        TimeRange::LastYear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Last7Days => "7days",
            TimeRange::Last30Days => "30days",
            TimeRange::Last90Days => "90days",
            TimeRange::LastYear => "1year",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Last7Days => "Last 7 days",
            TimeRange::Last30Days => "Last 30 days",
            TimeRange::Last90Days => "Last 90 days",
            TimeRange::LastYear => "Last year",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ModelError::UnknownTimeRange(s.to_string()))
    }
}

/// Engagement bucket assigned to a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    High,
    Medium,
    Low,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::High => "high",
            PostStatus::Medium => "medium",
            PostStatus::Low => "low",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(PostStatus::High),
            "medium" => Ok(PostStatus::Medium),
            "low" => Ok(PostStatus::Low),
            _ => Err(ModelError::UnknownStatus(s.to_string())),
        }
    }
}

/// Stable identity of a post. Ids are only unique within a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PostKey {
    pub platform: PlatformId,
    pub id: u64,
}

/// A single published post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub platform: PlatformId,
    pub content: String,
    pub engagement: u64,
    pub status: PostStatus,
    pub date: NaiveDate,
}

impl Post {
    pub fn key(&self) -> PostKey {
        PostKey {
            platform: self.platform,
            id: self.id,
        }
    }
}

/// Per-platform counters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub followers: u64,
    /// Engagement rate in percent
    pub engagement: f64,
    /// Follower growth in percent, may be negative
    pub growth: f64,
    #[serde(default)]
    pub recent_posts: Vec<Post>,
}

/// One labelled point of the historical series.
///
/// On the wire the platform values sit beside the label:
/// `{"name": "Jan", "facebook": 4000, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    #[serde(rename = "name")]
    pub label: String,
    #[serde(flatten)]
    pub values: BTreeMap<PlatformId, u64>,
}

impl HistoricalPoint {
    pub fn value(&self, platform: PlatformId) -> u64 {
        self.values.get(&platform).copied().unwrap_or(0)
    }
}

/// Full fetched dataset at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub platforms: BTreeMap<PlatformId, PlatformStats>,
    pub historical: Vec<HistoricalPoint>,
    pub total_followers: u64,
    pub total_engagement: f64,
    pub recent_posts: Vec<Post>,
}

impl MetricsSnapshot {
    /// Zero-valued snapshot: every platform present with empty counters
    pub fn empty() -> Self {
        Self {
            platforms: PlatformId::ALL
                .into_iter()
                .map(|p| (p, PlatformStats::default()))
                .collect(),
            historical: Vec::new(),
            total_followers: 0,
            total_engagement: 0.0,
            recent_posts: Vec::new(),
        }
    }

    pub fn platform(&self, platform: PlatformId) -> Option<&PlatformStats> {
        self.platforms.get(&platform)
    }
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
