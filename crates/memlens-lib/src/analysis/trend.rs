//! Whole-run memory trend classification
//!
//! Classifies a run from its first and last samples using RSS growth per hour
//! and RSS growth percent. Both conditions of a tier must hold; anything that
//! misses every tier is Anomalous.

use serde::{Deserialize, Serialize};

use super::{growth_percent, span_secs, MIN_SAMPLES_FOR_GROWTH};
use crate::config::TrendThresholds;
use crate::error::{AnalysisError, Result};
use crate::models::MemorySample;

const SECS_PER_HOUR: f64 = 3600.0;

/// Qualitative health of a run, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendStatus {
    Normal,
    Suspicious,
    Anomalous,
}

impl TrendStatus {
    pub fn description(&self) -> &'static str {
        match self {
            TrendStatus::Normal => "memory growth within normal range",
            TrendStatus::Suspicious => "memory growth slightly elevated, keep observing",
            TrendStatus::Anomalous => "memory growth abnormal, possible leak",
        }
    }
}

impl std::fmt::Display for TrendStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendStatus::Normal => write!(f, "normal"),
            TrendStatus::Suspicious => write!(f, "suspicious"),
            TrendStatus::Anomalous => write!(f, "anomalous"),
        }
    }
}

/// Classification of a whole run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendVerdict {
    pub status: TrendStatus,
    pub rationale: String,
    pub duration_hours: f64,
    pub rss_growth_mb: f64,
    pub rss_growth_percent: f64,
    pub rss_growth_per_hour: f64,
}

/// Applies [`TrendThresholds`] to run-level growth figures
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendClassifier {
    thresholds: TrendThresholds,
}

impl TrendClassifier {
    pub fn new(thresholds: TrendThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &TrendThresholds {
        &self.thresholds
    }

    /// Tier for a growth rate (MB/h) and percent; first matching tier wins
    pub fn status_for(&self, rate_mb_per_hour: f64, percent: f64) -> TrendStatus {
        let t = &self.thresholds;
        if rate_mb_per_hour < t.normal_max_rate_mb_per_hour && percent < t.normal_max_percent {
            TrendStatus::Normal
        } else if rate_mb_per_hour < t.suspicious_max_rate_mb_per_hour
            && percent < t.suspicious_max_percent
        {
            TrendStatus::Suspicious
        } else {
            TrendStatus::Anomalous
        }
    }

    /// Classify the span between two samples
    ///
    /// Returns [`AnalysisError::NonPositiveDuration`] when `last` is not
    /// strictly later than `first`.
    pub fn classify(&self, first: &MemorySample, last: &MemorySample) -> Result<TrendVerdict> {
        let seconds = span_secs(&first.timestamp, &last.timestamp);
        if seconds <= 0.0 {
            return Err(AnalysisError::NonPositiveDuration { seconds });
        }

        let duration_hours = seconds / SECS_PER_HOUR;
        let rss_growth_mb = last.rss_mb - first.rss_mb;
        let rss_growth_percent = growth_percent(first.rss_mb, rss_growth_mb);
        let rss_growth_per_hour = rss_growth_mb / duration_hours;
        let status = self.status_for(rss_growth_per_hour, rss_growth_percent);

        Ok(TrendVerdict {
            status,
            rationale: format!(
                "{} ({:+.2} MB/h, {:+.2}%)",
                status.description(),
                rss_growth_per_hour,
                rss_growth_percent
            ),
            duration_hours,
            rss_growth_mb,
            rss_growth_percent,
            rss_growth_per_hour,
        })
    }

    /// Classify a whole run from its first and last samples
    pub fn classify_run(&self, samples: &[MemorySample]) -> Result<TrendVerdict> {
        match samples {
            [first, .., last] => self.classify(first, last),
            _ => Err(AnalysisError::InsufficientSamples {
                found: samples.len(),
            }),
        }
    }
}
