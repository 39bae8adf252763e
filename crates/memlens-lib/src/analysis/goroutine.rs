//! Goroutine count and growth alerts
//!
//! Absolute thresholds are checked first (critical before warning); the growth
//! rate across a run is only consulted when the count itself is acceptable.

use serde::{Deserialize, Serialize};

use super::span_secs;
use crate::config::RuntimeThresholds;
use crate::models::MemorySample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Critical,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertLevel::Warning => write!(f, "warning"),
            AlertLevel::Critical => write!(f, "critical"),
        }
    }
}

/// Goroutine alert details
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoroutineAlert {
    pub level: AlertLevel,
    pub count: u64,
    /// Absolute threshold that was crossed, or the warn level for growth alerts
    pub threshold: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_per_minute: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_threshold: Option<f64>,
}

impl GoroutineAlert {
    pub fn message(&self) -> String {
        match self.growth_per_minute {
            Some(rate) => format!(
                "goroutines growing {:.1}/min (threshold {:.0}/min), now {}",
                rate,
                self.growth_threshold.unwrap_or_default(),
                self.count
            ),
            None => format!(
                "{} goroutines (threshold {}), possible goroutine leak",
                self.count, self.threshold
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GoroutineMonitor {
    thresholds: RuntimeThresholds,
}

impl GoroutineMonitor {
    pub fn new(thresholds: RuntimeThresholds) -> Self {
        Self { thresholds }
    }

    /// Alert for an absolute goroutine count
    pub fn check_count(&self, count: u64) -> Option<GoroutineAlert> {
        let t = &self.thresholds;
        let (level, threshold) = if count >= t.goroutine_critical {
            (AlertLevel::Critical, t.goroutine_critical)
        } else if count >= t.goroutine_warn {
            (AlertLevel::Warning, t.goroutine_warn)
        } else {
            return None;
        };

        Some(GoroutineAlert {
            level,
            count,
            threshold,
            growth_per_minute: None,
            growth_threshold: None,
        })
    }

    /// Alert for the last sample of a run, falling back to its growth rate
    pub fn check_run(&self, first: &MemorySample, last: &MemorySample) -> Option<GoroutineAlert> {
        if let Some(alert) = self.check_count(last.goroutine_count) {
            return Some(alert);
        }

        let minutes = span_secs(&first.timestamp, &last.timestamp) / 60.0;
        if minutes <= 0.0 {
            return None;
        }

        let growth = last.goroutine_count as f64 - first.goroutine_count as f64;
        let rate = growth / minutes;
        if rate <= self.thresholds.goroutine_growth_per_minute {
            return None;
        }

        Some(GoroutineAlert {
            level: AlertLevel::Warning,
            count: last.goroutine_count,
            threshold: self.thresholds.goroutine_warn,
            growth_per_minute: Some(rate),
            growth_threshold: Some(self.thresholds.goroutine_growth_per_minute),
        })
    }
}
