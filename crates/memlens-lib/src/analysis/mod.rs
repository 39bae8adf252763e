//! Growth analysis over an assembled sample store
//!
//! This module provides:
//! - Fixed-width window aggregation (first vs. last sample per bucket)
//! - Whole-run trend classification (Normal / Suspicious / Anomalous)
//! - Goroutine count and growth alerts
//! - The run summary that combines them

use chrono::{DateTime, FixedOffset};

mod goroutine;
mod summary;
mod trend;
mod window;

#[cfg(test)]
mod tests;

pub use goroutine::{AlertLevel, GoroutineAlert, GoroutineMonitor};
pub use summary::{summarize, RunSummary};
pub use trend::{TrendClassifier, TrendStatus, TrendVerdict};
pub use window::{WindowAggregator, WindowStat};

/// Minimum samples for any growth figure
pub const MIN_SAMPLES_FOR_GROWTH: usize = 2;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Growth as a percentage of `start`; 0 when there is no baseline
pub(crate) fn growth_percent(start: f64, growth: f64) -> f64 {
    if start > 0.0 {
        growth / start * 100.0
    } else {
        0.0
    }
}

/// Signed MB delta between two raw byte counters
pub(crate) fn bytes_delta_mb(first: u64, last: u64) -> f64 {
    (last as f64 - first as f64) / BYTES_PER_MB
}

/// Signed delta of a counter that is expected to grow
pub(crate) fn counter_delta(first: u64, last: u64) -> i64 {
    last.wrapping_sub(first) as i64
}

/// Seconds from `first` to `last` at microsecond precision
pub(crate) fn span_secs(first: &DateTime<FixedOffset>, last: &DateTime<FixedOffset>) -> f64 {
    let elapsed = last.signed_duration_since(*first);
    elapsed
        .num_microseconds()
        .map(|us| us as f64 / 1_000_000.0)
        .unwrap_or_else(|| elapsed.num_milliseconds() as f64 / 1000.0)
}
