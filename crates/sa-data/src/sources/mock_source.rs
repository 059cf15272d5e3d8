use std::sync::Arc;
use std::time::Duration;

use ahash::AHashSet;
use async_trait::async_trait;
use parking_lot::RwLock;
use sa_core::{
    DataSource, HistoricalPoint, MetricsSnapshot, PlatformId, PlatformStats, RequestClass,
    SourceError, TimeRange,
};
use tracing::{debug, info};

use crate::config::{LatencyConfig, SourceConfig};
use crate::schema::WireSnapshot;
use crate::DataError;

/// Metrics bundled with the crate
const BUNDLED_FIXTURE: &str = include_str!("../../fixtures/social_metrics.json");

/// In-memory data source with simulated latency and failures
pub struct MockSource {
    name: String,
    snapshot: Arc<MetricsSnapshot>,
    latency: LatencyConfig,
    /// Request classes that currently fail
    failing: RwLock<AHashSet<RequestClass>>,
}

impl MockSource {
    /// Create a source serving the bundled metrics
    pub fn bundled() -> Result<Self, DataError> {
        Self::from_json("bundled", BUNDLED_FIXTURE)
    }

    /// Create a source from a metrics document
    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self, DataError> {
        let snapshot = WireSnapshot::from_json(json)?.into_snapshot()?;
        Ok(Self::new(name, snapshot))
    }

    pub fn new(name: impl Into<String>, snapshot: MetricsSnapshot) -> Self {
        Self {
            name: name.into(),
            snapshot: Arc::new(snapshot),
            latency: LatencyConfig::default(),
            failing: RwLock::new(AHashSet::new()),
        }
    }

    /// Create a source as described by the configuration
    pub fn from_config(config: &SourceConfig) -> Result<Self, DataError> {
        let source = match &config.fixture {
            Some(path) => {
                let json = std::fs::read_to_string(path)?;
                Self::from_json(path.display().to_string(), &json)?
            }
            None => Self::bundled()?,
        };

        for class in &config.failing {
            source.set_failing(*class, true);
        }

        info!(
            "Mock source '{}' ready with {} platforms and {} historical points",
            source.name,
            source.snapshot.platforms.len(),
            source.snapshot.historical.len()
        );

        Ok(source.with_latency(config.latency.clone()))
    }

    pub fn with_latency(mut self, latency: LatencyConfig) -> Self {
        self.latency = latency;
        self
    }

    /// Make every request of `class` fail until switched back
    pub fn set_failing(&self, class: RequestClass, failing: bool) {
        let mut set = self.failing.write();
        if failing {
            set.insert(class);
        } else {
            set.remove(&class);
        }
    }

    pub fn snapshot(&self) -> &MetricsSnapshot {
        &self.snapshot
    }

    /// Wait out the simulated latency, then report an injected failure
    async fn respond(&self, class: RequestClass) -> Result<(), SourceError> {
        let delay = self.latency.get(class);
        if delay > Duration::ZERO {
            tokio::time::sleep(delay).await;
        }

        if self.failing.read().contains(&class) {
            debug!("Injected failure for {} request", class);
            return Err(SourceError::Transport(format!(
                "{} is unavailable",
                class.as_str()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DataSource for MockSource {
    async fn fetch_all(&self) -> Result<MetricsSnapshot, SourceError> {
        self.respond(RequestClass::All).await?;
        Ok(self.snapshot.as_ref().clone())
    }

    async fn fetch_platform(&self, platform: PlatformId) -> Result<PlatformStats, SourceError> {
        self.respond(RequestClass::Platform).await?;
        self.snapshot
            .platform(platform)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                platform: platform.to_string(),
            })
    }

    async fn fetch_historical(&self, range: TimeRange) -> Result<Vec<HistoricalPoint>, SourceError> {
        self.respond(RequestClass::Historical).await?;
        // The series does not depend on the range
        debug!("Serving {} historical points for {}", self.snapshot.historical.len(), range);
        Ok(self.snapshot.historical.clone())
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sa_core::FetchGateway;

    #[test]
    fn test_bundled_metrics() {
        let source = MockSource::bundled().unwrap();
        let snapshot = source.snapshot();

        assert_eq!(snapshot.platforms.len(), 4);
        assert_eq!(snapshot.total_followers, 12500 + 8750 + 15200 + 5400);
        assert_eq!(snapshot.recent_posts.len(), 8);
        assert_eq!(snapshot.historical.len(), 7);
        assert_eq!(snapshot.historical[0].label, "Jan");
        assert!(snapshot
            .recent_posts
            .windows(2)
            .all(|pair| pair[0].date >= pair[1].date));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_simulated() {
        let source = MockSource::bundled().unwrap();
        let started = tokio::time::Instant::now();

        source.fetch_platform(PlatformId::Twitter).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(600));
    }

    #[tokio::test]
    async fn test_injected_failure_can_be_cleared() {
        let source = MockSource::bundled().unwrap().with_latency(LatencyConfig::none());

        source.set_failing(RequestClass::Historical, true);
        let err = source.fetch_historical(TimeRange::Last7Days).await.unwrap_err();
        assert!(matches!(err, SourceError::Transport(_)));
        // Other classes are unaffected
        assert!(source.fetch_all().await.is_ok());

        source.set_failing(RequestClass::Historical, false);
        assert_eq!(source.fetch_historical(TimeRange::Last7Days).await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_missing_platform() {
        let json = r#"{ "platforms": { "twitter": { "followers": 1, "engagement": 1.0, "growth": 0.0 } } }"#;
        let source = MockSource::from_json("partial", json)
            .unwrap()
            .with_latency(LatencyConfig::none());

        let err = source.fetch_platform(PlatformId::LinkedIn).await.unwrap_err();
        assert_eq!(err.to_string(), "Platform linkedin not found");
    }

    #[tokio::test]
    async fn test_through_gateway() {
        let source = MockSource::bundled().unwrap().with_latency(LatencyConfig::none());
        let gateway = FetchGateway::new(Arc::new(source));

        let envelope = gateway.fetch_platform("instagram").await;
        assert!(envelope.success);
        assert_eq!(envelope.data.unwrap().stats.followers, 15200);

        let envelope = gateway.fetch_platform("tiktok").await;
        assert!(!envelope.success);
        assert_eq!(
            envelope.error.as_deref(),
            Some("Failed to fetch tiktok data: Platform tiktok not found")
        );
    }

    #[test]
    fn test_from_config_marks_failing_classes() {
        let config = SourceConfig {
            failing: vec![RequestClass::All],
            ..SourceConfig::default()
        };
        let source = MockSource::from_config(&config).unwrap();
        assert!(source.failing.read().contains(&RequestClass::All));
        assert_eq!(source.source_name(), "bundled");
    }
}
