//! Wire schema of a metrics response
//!
//! The response may leave out values that can be derived: the totals, the
//! merged `recentPosts` list, and the `platform` of posts nested under a
//! platform. Conversion into [`MetricsSnapshot`] fills them in and checks
//! that post identities are unique.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use sa_core::model::{HistoricalPoint, MetricsSnapshot, PlatformId, PlatformStats, Post, PostStatus};
use serde::Deserialize;

use crate::DataError;

/// A post as it appears under a platform
#[derive(Debug, Clone, Deserialize)]
pub struct WirePost {
    pub id: u64,
    #[serde(default)]
    pub platform: Option<PlatformId>,
    pub content: String,
    pub engagement: u64,
    pub status: PostStatus,
    pub date: NaiveDate,
}

impl WirePost {
    fn into_post(self, owner: PlatformId) -> Post {
        Post {
            id: self.id,
            platform: self.platform.unwrap_or(owner),
            content: self.content,
            engagement: self.engagement,
            status: self.status,
            date: self.date,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePlatformStats {
    pub followers: u64,
    pub engagement: f64,
    pub growth: f64,
    #[serde(default)]
    pub recent_posts: Vec<WirePost>,
}

/// Top-level metrics response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSnapshot {
    pub platforms: BTreeMap<PlatformId, WirePlatformStats>,
    #[serde(default)]
    pub historical: Vec<HistoricalPoint>,
    pub total_followers: Option<u64>,
    pub total_engagement: Option<f64>,
    pub recent_posts: Option<Vec<Post>>,
}

impl WireSnapshot {
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the snapshot, deriving whatever the response left out
    pub fn into_snapshot(self) -> Result<MetricsSnapshot, DataError> {
        let platforms: BTreeMap<PlatformId, PlatformStats> = self
            .platforms
            .into_iter()
            .map(|(id, wire)| {
                let stats = PlatformStats {
                    followers: wire.followers,
                    engagement: wire.engagement,
                    growth: wire.growth,
                    recent_posts: wire
                        .recent_posts
                        .into_iter()
                        .map(|p| p.into_post(id))
                        .collect(),
                };
                (id, stats)
            })
            .collect();

        for stats in platforms.values() {
            check_unique(&stats.recent_posts)?;
        }

        let total_followers = self
            .total_followers
            .unwrap_or_else(|| platforms.values().map(|s| s.followers).sum());

        let total_engagement = self.total_engagement.unwrap_or_else(|| {
            if platforms.is_empty() {
                0.0
            } else {
                platforms.values().map(|s| s.engagement).sum::<f64>() / platforms.len() as f64
            }
        });

        let recent_posts = match self.recent_posts {
            Some(posts) => posts,
            None => merged_posts(&platforms),
        };
        check_unique(&recent_posts)?;

        Ok(MetricsSnapshot {
            platforms,
            historical: self.historical,
            total_followers,
            total_engagement,
            recent_posts,
        })
    }
}

/// All platform posts, newest first. Same-day posts keep platform order.
fn merged_posts(platforms: &BTreeMap<PlatformId, PlatformStats>) -> Vec<Post> {
    let mut posts: Vec<Post> = PlatformId::ALL
        .iter()
        .filter_map(|id| platforms.get(id))
        .flat_map(|stats| stats.recent_posts.iter().cloned())
        .collect();
    posts.sort_by(|a, b| b.date.cmp(&a.date));
    posts
}

fn check_unique(posts: &[Post]) -> Result<(), DataError> {
    let mut seen = HashSet::new();
    for post in posts {
        if !seen.insert(post.key()) {
            return Err(DataError::DuplicatePost {
                platform: post.platform.to_string(),
                id: post.id,
            });
        }
    }
    Ok(())
}
