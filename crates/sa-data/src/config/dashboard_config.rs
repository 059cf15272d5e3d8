//! Dashboard configuration loaded from JSON
//!
//! Every field has a default, so an empty object is a valid configuration.
//! Durations are written the human way ("800ms", "1s").

use std::path::{Path, PathBuf};
use std::time::Duration;

use sa_core::{FilterState, RequestClass};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::DataError;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardConfig {
    pub source: SourceConfig,
    pub rate_limits: RateLimitConfig,
    /// Filters the store starts with and resets to
    pub filters: FilterState,
}

impl DashboardConfig {
    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), DataError> {
        if self.rate_limits.range_throttle.is_zero() {
            return Err(DataError::Config(
                "rateLimits.rangeThrottle must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings of the mock data source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceConfig {
    pub latency: LatencyConfig,
    /// Request classes that always fail
    pub failing: Vec<RequestClass>,
    /// Metrics file to serve instead of the bundled one
    pub fixture: Option<PathBuf>,
}

/// Simulated response time per request class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    #[serde(with = "human_duration")]
    pub all: Duration,
    #[serde(with = "human_duration")]
    pub platform: Duration,
    #[serde(with = "human_duration")]
    pub historical: Duration,
}

impl LatencyConfig {
    pub fn get(&self, class: RequestClass) -> Duration {
        match class {
            RequestClass::All => self.all,
            RequestClass::Platform => self.platform,
            RequestClass::Historical => self.historical,
        }
    }

    /// No artificial delay at all
    pub fn none() -> Self {
        Self {
            all: Duration::ZERO,
            platform: Duration::ZERO,
            historical: Duration::ZERO,
        }
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            all: Duration::from_millis(800),
            platform: Duration::from_millis(600),
            historical: Duration::from_millis(700),
        }
    }
}

/// Delays of the input rate limiters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RateLimitConfig {
    #[serde(with = "human_duration")]
    pub search_debounce: Duration,
    #[serde(with = "human_duration")]
    pub range_throttle: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            search_debounce: Duration::from_millis(300),
            range_throttle: Duration::from_millis(500),
        }
    }
}

/// Parse a duration such as "300ms" or "1s"
pub fn parse_duration(value: &str) -> Result<Duration, DataError> {
    humantime::parse_duration(value).map_err(|e| DataError::InvalidDuration {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

mod human_duration {
    use std::time::Duration;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_duration(&text).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sa_core::{PlatformFilter, PlatformId, TimeRange};

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DashboardConfig::from_json("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.source.latency.get(RequestClass::All), Duration::from_millis(800));
        assert_eq!(config.rate_limits.search_debounce, Duration::from_millis(300));
        assert_eq!(config.filters.date_range, TimeRange::Last30Days);
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{
            "source": { "latency": { "historical": "2s" }, "failing": ["platform"] },
            "rateLimits": { "searchDebounce": "150ms" },
            "filters": { "platform": "twitter", "dateRange": "7days" }
        }"#;
        let config = DashboardConfig::from_json(json).unwrap();

        assert_eq!(config.source.latency.historical, Duration::from_secs(2));
        assert_eq!(config.source.latency.all, Duration::from_millis(800));
        assert_eq!(config.source.failing, vec![RequestClass::Platform]);
        assert_eq!(config.rate_limits.search_debounce, Duration::from_millis(150));
        assert_eq!(config.rate_limits.range_throttle, Duration::from_millis(500));
        assert_eq!(config.filters.platform, PlatformFilter::Only(PlatformId::Twitter));
        assert_eq!(config.filters.date_range, TimeRange::Last7Days);
    }

    #[test]
    fn test_bad_values() {
        let bad_duration = r#"{ "rateLimits": { "searchDebounce": "soon" } }"#;
        assert!(matches!(DashboardConfig::from_json(bad_duration), Err(DataError::Json(_))));

        let zero_throttle = r#"{ "rateLimits": { "rangeThrottle": "0s" } }"#;
        assert!(matches!(DashboardConfig::from_json(zero_throttle), Err(DataError::Config(_))));

        assert!(matches!(parse_duration("fast"), Err(DataError::InvalidDuration { .. })));
    }

    #[test]
    fn test_durations_serialize_readably() {
        let json = serde_json::to_value(RateLimitConfig::default()).unwrap();
        assert_eq!(json["searchDebounce"], "300ms");
        assert_eq!(json["rangeThrottle"], "500ms");
    }
}
