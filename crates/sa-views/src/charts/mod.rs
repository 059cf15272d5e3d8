//! Chart projections over a metrics snapshot

use sa_core::{HistoricalPoint, MetricsSnapshot, PlatformId};
use serde::Serialize;

/// One line of the engagement chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub platform: PlatformId,
    pub values: Vec<u64>,
}

/// Per-platform lines over the historical labels
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngagementChart {
    /// Time labels in chronological order
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

impl EngagementChart {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn series(&self, platform: PlatformId) -> Option<&Series> {
        self.series.iter().find(|s| s.platform == platform)
    }
}

/// Build one series per platform, keeping the order of `historical`
pub fn engagement_series(historical: &[HistoricalPoint]) -> EngagementChart {
    let labels = historical.iter().map(|point| point.label.clone()).collect();
    let series = PlatformId::ALL
        .iter()
        .map(|&platform| Series {
            platform,
            values: historical.iter().map(|point| point.value(platform)).collect(),
        })
        .collect();

    EngagementChart { labels, series }
}

/// A platform's slice of the audience
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSlice {
    pub platform: PlatformId,
    pub followers: u64,
    /// Fraction of all followers, 0 when nobody follows anything
    pub share: f64,
}

/// Followers per platform for all four platforms
pub fn platform_distribution(snapshot: &MetricsSnapshot) -> Vec<DistributionSlice> {
    let followers: Vec<(PlatformId, u64)> = PlatformId::ALL
        .iter()
        .map(|&platform| {
            let count = snapshot.platform(platform).map_or(0, |stats| stats.followers);
            (platform, count)
        })
        .collect();
    let total: u64 = followers.iter().map(|(_, count)| count).sum();

    followers
        .into_iter()
        .map(|(platform, followers)| DistributionSlice {
            platform,
            followers,
            share: if total == 0 {
                0.0
            } else {
                followers as f64 / total as f64
            },
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn from_growth(growth: f64) -> Self {
        if growth > 0.0 {
            Trend::Up
        } else if growth < 0.0 {
            Trend::Down
        } else {
            Trend::Flat
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
            Trend::Flat => "■",
        }
    }
}

/// Headline numbers of one platform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub platform: PlatformId,
    pub title: &'static str,
    pub followers: u64,
    pub engagement: f64,
    pub growth: f64,
    pub trend: Trend,
}

/// One card per platform; platforms missing from the snapshot show zeros
pub fn stat_cards(snapshot: &MetricsSnapshot) -> Vec<StatCard> {
    PlatformId::ALL
        .iter()
        .map(|&platform| {
            let stats = snapshot.platform(platform).cloned().unwrap_or_default();
            StatCard {
                platform,
                title: platform.label(),
                followers: stats.followers,
                engagement: stats.engagement,
                growth: stats.growth,
                trend: Trend::from_growth(stats.growth),
            }
        })
        .collect()
}
