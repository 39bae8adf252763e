//! Analysis configuration
//!
//! Every threshold is a named field so deployments can override it from a
//! config file or the environment. Defaults match the policy the telemetry
//! producer was tuned against.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AnalysisError, Result};

/// Record-kind identifier written by the telemetry producer
pub const DEFAULT_MARKER: &str = "memory_sample";

/// Default growth window (one hour)
pub const DEFAULT_BUCKET_SECS: u64 = 60 * 60;

/// Default base URL of the live introspection endpoint
pub const DEFAULT_BASE_URL: &str = "http://localhost:28680";

/// Path of the memory introspection endpoint, relative to the base URL
pub const MEMORY_ENDPOINT_PATH: &str = "api/v1/system/memory";

/// Default timeout for the single live fetch
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

const MIB: u64 = 1024 * 1024;

/// Top-level configuration for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Marker token a log line must contain to be considered
    pub marker: String,
    /// Width of a growth window in seconds
    pub bucket_secs: u64,
    pub trend: TrendThresholds,
    pub modules: ModuleThresholds,
    pub runtime: RuntimeThresholds,
    pub live: LiveConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            bucket_secs: DEFAULT_BUCKET_SECS,
            trend: TrendThresholds::default(),
            modules: ModuleThresholds::default(),
            runtime: RuntimeThresholds::default(),
            live: LiveConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Reject configurations that would make a stage meaningless
    pub fn validate(&self) -> Result<()> {
        if self.marker.trim().is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "marker must not be empty".to_string(),
            ));
        }
        if self.bucket_secs == 0 {
            return Err(AnalysisError::InvalidConfig(
                "bucket_secs must be greater than zero".to_string(),
            ));
        }
        if self.live.timeout_secs == 0 {
            return Err(AnalysisError::InvalidConfig(
                "live.timeout_secs must be greater than zero".to_string(),
            ));
        }
        self.trend.validate()?;
        self.runtime.validate()
    }

    /// Growth window as a [`Duration`]
    pub fn bucket_width(&self) -> Duration {
        Duration::from_secs(self.bucket_secs)
    }
}

/// Trend classification policy
///
/// A run is Normal when both rate and percent stay under the normal limits,
/// Suspicious when both stay under the suspicious limits, Anomalous otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendThresholds {
    pub normal_max_rate_mb_per_hour: f64,
    pub normal_max_percent: f64,
    pub suspicious_max_rate_mb_per_hour: f64,
    pub suspicious_max_percent: f64,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            normal_max_rate_mb_per_hour: 20.0,
            normal_max_percent: 2.0,
            suspicious_max_rate_mb_per_hour: 50.0,
            suspicious_max_percent: 5.0,
        }
    }
}

impl TrendThresholds {
    fn validate(&self) -> Result<()> {
        let values = [
            self.normal_max_rate_mb_per_hour,
            self.normal_max_percent,
            self.suspicious_max_rate_mb_per_hour,
            self.suspicious_max_percent,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AnalysisError::InvalidConfig(
                "trend thresholds must be finite".to_string(),
            ));
        }
        if self.normal_max_rate_mb_per_hour > self.suspicious_max_rate_mb_per_hour
            || self.normal_max_percent > self.suspicious_max_percent
        {
            return Err(AnalysisError::InvalidConfig(
                "normal trend thresholds must not exceed suspicious ones".to_string(),
            ));
        }
        Ok(())
    }
}

/// Absolute per-module limits used by the live ranker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleThresholds {
    /// Approximate bytes above which a module is a high-memory issue
    pub high_memory_bytes: u64,
    pub object_count: u64,
    pub queue_length: u64,
    pub cache_items: u64,
}

impl Default for ModuleThresholds {
    fn default() -> Self {
        Self {
            high_memory_bytes: 100 * MIB,
            object_count: 100_000,
            queue_length: 10_000,
            cache_items: 100_000,
        }
    }
}

/// Goroutine limits, applied to both log runs and live snapshots
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeThresholds {
    pub goroutine_warn: u64,
    pub goroutine_critical: u64,
    /// Growth per minute across a log run that raises a warning
    pub goroutine_growth_per_minute: f64,
}

impl Default for RuntimeThresholds {
    fn default() -> Self {
        Self {
            goroutine_warn: 5_000,
            goroutine_critical: 10_000,
            goroutine_growth_per_minute: 500.0,
        }
    }
}

impl RuntimeThresholds {
    fn validate(&self) -> Result<()> {
        if self.goroutine_warn > self.goroutine_critical {
            return Err(AnalysisError::InvalidConfig(
                "runtime.goroutine_warn must not exceed runtime.goroutine_critical".to_string(),
            ));
        }
        if !self.goroutine_growth_per_minute.is_finite() {
            return Err(AnalysisError::InvalidConfig(
                "runtime.goroutine_growth_per_minute must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Live endpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LiveConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bucket_width(), Duration::from_secs(3600));
        assert_eq!(config.modules.high_memory_bytes, 104_857_600);
        assert_eq!(config.live.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_zero_bucket_rejected() {
        let config = AnalysisConfig {
            bucket_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_inverted_trend_thresholds_rejected() {
        let mut config = AnalysisConfig::default();
        config.trend.normal_max_percent = 10.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"trend": {"normal_max_percent": 3.0}, "live": {"base_url": "http://node:9000"}}"#;
        let config: AnalysisConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.trend.normal_max_percent, 3.0);
        assert_eq!(config.trend.normal_max_rate_mb_per_hour, 20.0);
        assert_eq!(config.live.base_url, "http://node:9000");
        assert_eq!(config.live.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.marker, DEFAULT_MARKER);
    }
}
