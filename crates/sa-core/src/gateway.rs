//! Uniform success/failure envelope around data source calls

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::data::{DataSource, SourceError};
use crate::model::{HistoricalPoint, MetricsSnapshot, PlatformId, PlatformStats, TimeRange};

/// Result of a gateway call. Exactly one of `data` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchEnvelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> FetchEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Convert into a `Result`, treating a malformed envelope as a failure
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data, self.error) {
            (true, Some(data), _) => Ok(data),
            (_, _, Some(error)) => Err(error),
            _ => Err("Unknown error".to_string()),
        }
    }
}

/// Payload of a successful platform fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformPayload {
    pub platform: PlatformId,
    pub stats: PlatformStats,
}

/// Payload of a successful historical fetch; the range is echoed back
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPayload {
    pub points: Vec<HistoricalPoint>,
    pub time_range: TimeRange,
}

/// Wraps a data source so callers only ever see envelopes
#[derive(Clone)]
pub struct FetchGateway {
    source: Arc<dyn DataSource>,
}

impl FetchGateway {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self { source }
    }

    pub fn source_name(&self) -> &str {
        self.source.source_name()
    }

    pub async fn fetch_all(&self) -> FetchEnvelope<MetricsSnapshot> {
        match self.source.fetch_all().await {
            Ok(snapshot) => {
                debug!(
                    source = self.source_name(),
                    posts = snapshot.recent_posts.len(),
                    "Fetched metrics snapshot"
                );
                FetchEnvelope::ok(snapshot)
            }
            Err(e) => {
                warn!("Error fetching social media stats: {}", e);
                FetchEnvelope::failed(format!("Failed to fetch social media statistics: {}", e))
            }
        }
    }

    /// Fetch one platform. The identifier is validated here, so an unknown
    /// name never reaches the source.
    pub async fn fetch_platform(&self, platform: &str) -> FetchEnvelope<PlatformPayload> {
        let result = match platform.parse::<PlatformId>() {
            Ok(id) => self
                .source
                .fetch_platform(id)
                .await
                .map(|stats| PlatformPayload { platform: id, stats }),
            Err(_) => Err(SourceError::NotFound {
                platform: platform.to_string(),
            }),
        };

        match result {
            Ok(payload) => {
                debug!(platform = %payload.platform, "Fetched platform data");
                FetchEnvelope::ok(payload)
            }
            Err(e) => {
                warn!("Error fetching {} data: {}", platform, e);
                FetchEnvelope::failed(format!("Failed to fetch {} data: {}", platform, e))
            }
        }
    }

    pub async fn fetch_historical(&self, range: TimeRange) -> FetchEnvelope<HistoricalPayload> {
        match self.source.fetch_historical(range).await {
            Ok(points) => {
                debug!(range = %range, points = points.len(), "Fetched historical data");
                FetchEnvelope::ok(HistoricalPayload {
                    points,
                    time_range: range,
                })
            }
            Err(e) => {
                warn!("Error fetching historical data: {}", e);
                FetchEnvelope::failed(format!("Failed to fetch historical data: {}", e))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;

    /// In-memory source; `fail` turns every call into a transport error
    pub(crate) struct StaticSource {
        pub snapshot: MetricsSnapshot,
        pub fail: bool,
    }

    #[async_trait]
    impl DataSource for StaticSource {
        async fn fetch_all(&self) -> Result<MetricsSnapshot, SourceError> {
            if self.fail {
                return Err(SourceError::Transport("connection reset".to_string()));
            }
            Ok(self.snapshot.clone())
        }

        async fn fetch_platform(&self, platform: PlatformId) -> Result<PlatformStats, SourceError> {
            if self.fail {
                return Err(SourceError::Transport("connection reset".to_string()));
            }
            self.snapshot
                .platform(platform)
                .cloned()
                .ok_or(SourceError::NotFound {
                    platform: platform.to_string(),
                })
        }

        async fn fetch_historical(&self, _range: TimeRange) -> Result<Vec<HistoricalPoint>, SourceError> {
            if self.fail {
                return Err(SourceError::Transport("connection reset".to_string()));
            }
            Ok(self.snapshot.historical.clone())
        }

        fn source_name(&self) -> &str {
            "static"
        }
    }

    fn gateway(fail: bool) -> FetchGateway {
        FetchGateway::new(Arc::new(StaticSource {
            snapshot: MetricsSnapshot::empty(),
            fail,
        }))
    }

    #[tokio::test]
    async fn test_known_platforms_succeed() {
        let gateway = gateway(false);
        for platform in ["facebook", "twitter", "instagram", "linkedin", "LinkedIn"] {
            let envelope = gateway.fetch_platform(platform).await;
            assert!(envelope.success, "{} should succeed", platform);
        }
    }

    #[tokio::test]
    async fn test_unknown_platform_envelope() {
        let envelope = gateway(false).fetch_platform("snapchat").await;
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert_eq!(
            envelope.error.as_deref(),
            Some("Failed to fetch snapchat data: Platform snapchat not found")
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_wrapped() {
        let gateway = gateway(true);
        let all = gateway.fetch_all().await;
        assert_eq!(
            all.into_result().unwrap_err(),
            "Failed to fetch social media statistics: Transport error: connection reset"
        );

        let historical = gateway.fetch_historical(TimeRange::Last7Days).await;
        assert!(!historical.success);
    }

    #[tokio::test]
    async fn test_historical_echoes_range() {
        let envelope = gateway(false).fetch_historical(TimeRange::Last90Days).await;
        let payload = envelope.into_result().unwrap();
        assert_eq!(payload.time_range, TimeRange::Last90Days);
    }

    #[test]
    fn test_envelope_json_shape() {
        let json = serde_json::to_value(FetchEnvelope::<u32>::failed("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "boom"}));
    }
}
