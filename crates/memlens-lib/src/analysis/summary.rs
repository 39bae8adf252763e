//! Run summary: overall change between the first and last sample

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::{
    bytes_delta_mb, counter_delta, GoroutineAlert, GoroutineMonitor, TrendClassifier,
    TrendVerdict,
};
use crate::error::{AnalysisError, Result};
use crate::models::MemorySample;

/// Summary record for a log run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<FixedOffset>,
    pub ended_at: DateTime<FixedOffset>,
    pub duration_hours: f64,
    pub sample_count: usize,
    /// Average seconds between samples (duration / sample count)
    pub sampling_interval_secs: f64,
    pub rss_start_mb: f64,
    pub rss_end_mb: f64,
    pub rss_growth_mb: f64,
    pub rss_growth_percent: f64,
    pub rss_growth_per_hour: f64,
    pub heap_start_mb: f64,
    pub heap_end_mb: f64,
    pub heap_growth_mb: f64,
    pub gc_start: u64,
    pub gc_end: u64,
    pub gc_growth: i64,
    pub goroutines_start: u64,
    pub goroutines_end: u64,
    pub goroutine_growth: i64,
    pub verdict: TrendVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goroutine_alert: Option<GoroutineAlert>,
}

/// Summarise a run of at least two samples spanning a positive duration
pub fn summarize(
    samples: &[MemorySample],
    classifier: &TrendClassifier,
    monitor: &GoroutineMonitor,
) -> Result<RunSummary> {
    let (first, last) = match samples {
        [first, .., last] => (first, last),
        _ => {
            return Err(AnalysisError::InsufficientSamples {
                found: samples.len(),
            })
        }
    };

    let verdict = classifier.classify(first, last)?;
    let duration_secs = verdict.duration_hours * 3600.0;

    Ok(RunSummary {
        started_at: first.timestamp,
        ended_at: last.timestamp,
        duration_hours: verdict.duration_hours,
        sample_count: samples.len(),
        sampling_interval_secs: duration_secs / samples.len() as f64,
        rss_start_mb: first.rss_mb,
        rss_end_mb: last.rss_mb,
        rss_growth_mb: verdict.rss_growth_mb,
        rss_growth_percent: verdict.rss_growth_percent,
        rss_growth_per_hour: verdict.rss_growth_per_hour,
        heap_start_mb: first.heap_mb,
        heap_end_mb: last.heap_mb,
        heap_growth_mb: bytes_delta_mb(first.heap_alloc_bytes, last.heap_alloc_bytes),
        gc_start: first.gc_count,
        gc_end: last.gc_count,
        gc_growth: counter_delta(first.gc_count, last.gc_count),
        goroutines_start: first.goroutine_count,
        goroutines_end: last.goroutine_count,
        goroutine_growth: counter_delta(first.goroutine_count, last.goroutine_count),
        goroutine_alert: monitor.check_run(first, last),
        verdict,
    })
}
