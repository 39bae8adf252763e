//! Windowed growth aggregation
//!
//! Buckets ordered samples into fixed-width windows (one hour by default) and
//! reports growth between the first and last sample of each window. A single
//! left-to-right pass drives a two-state accumulator; a bucket is flushed when
//! the bucket key changes and once more at end of input.

use chrono::{DateTime, Duration as ChronoDuration, FixedOffset};
use serde::Serialize;
use std::time::Duration;

use super::{bytes_delta_mb, counter_delta, growth_percent, MIN_SAMPLES_FOR_GROWTH};
use crate::config::DEFAULT_BUCKET_SECS;
use crate::error::{AnalysisError, Result};
use crate::models::MemorySample;

/// Growth statistics for one window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowStat {
    /// Bucket anchor: first sample's timestamp truncated to the bucket width
    pub window_start: DateTime<FixedOffset>,
    pub rss_start_mb: f64,
    pub rss_end_mb: f64,
    pub rss_growth_mb: f64,
    pub rss_growth_percent: f64,
    /// Computed from raw allocation bytes, not the rounded MB field
    pub heap_growth_mb: f64,
    pub gc_growth: i64,
    pub goroutine_growth: i64,
    pub sample_count: usize,
}

impl WindowStat {
    fn from_bounds(
        window_start: DateTime<FixedOffset>,
        first: &MemorySample,
        last: &MemorySample,
        sample_count: usize,
    ) -> Self {
        let rss_growth_mb = last.rss_mb - first.rss_mb;
        Self {
            window_start,
            rss_start_mb: first.rss_mb,
            rss_end_mb: last.rss_mb,
            rss_growth_mb,
            rss_growth_percent: growth_percent(first.rss_mb, rss_growth_mb),
            heap_growth_mb: bytes_delta_mb(first.heap_alloc_bytes, last.heap_alloc_bytes),
            gc_growth: counter_delta(first.gc_count, last.gc_count),
            goroutine_growth: counter_delta(first.goroutine_count, last.goroutine_count),
            sample_count,
        }
    }
}

/// Open bucket during the scan
enum Bucket<'a> {
    Empty,
    Accumulating {
        key: DateTime<FixedOffset>,
        first: &'a MemorySample,
        last: &'a MemorySample,
        count: usize,
    },
}

impl Bucket<'_> {
    /// Window for this bucket if it holds enough samples to express growth
    fn flush(&self) -> Option<WindowStat> {
        match self {
            Bucket::Accumulating {
                key,
                first,
                last,
                count,
            } if *count >= MIN_SAMPLES_FOR_GROWTH => {
                Some(WindowStat::from_bounds(*key, first, last, *count))
            }
            _ => None,
        }
    }
}

/// Aggregates samples into fixed-width growth windows
#[derive(Debug, Clone, Copy)]
pub struct WindowAggregator {
    bucket_secs: i64,
}

impl WindowAggregator {
    /// Create an aggregator with the given bucket width (whole seconds)
    pub fn new(bucket: Duration) -> Result<Self> {
        let bucket_secs = i64::try_from(bucket.as_secs())
            .map_err(|_| AnalysisError::InvalidConfig("bucket width too large".to_string()))?;
        if bucket_secs == 0 {
            return Err(AnalysisError::InvalidConfig(
                "bucket width must be at least one second".to_string(),
            ));
        }
        Ok(Self { bucket_secs })
    }

    /// One-hour buckets
    pub fn hourly() -> Self {
        Self {
            bucket_secs: DEFAULT_BUCKET_SECS as i64,
        }
    }

    pub fn bucket_width(&self) -> Duration {
        Duration::from_secs(self.bucket_secs.unsigned_abs())
    }

    /// Truncate a timestamp to its bucket anchor
    ///
    /// Truncation happens on the wall clock of the sample's own offset, so an
    /// hourly bucket for `16:40+08:00` starts at `16:00+08:00`.
    pub fn bucket_key(&self, ts: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        let offset = i64::from(ts.offset().local_minus_utc());
        let local_secs = ts.timestamp() + offset;
        let into_bucket = ChronoDuration::seconds(local_secs.rem_euclid(self.bucket_secs))
            + ChronoDuration::nanoseconds(i64::from(ts.timestamp_subsec_nanos()));
        ts.checked_sub_signed(into_bucket).unwrap_or(*ts)
    }

    /// Aggregate ordered samples into windows
    ///
    /// Windows with fewer than two samples are omitted rather than zero-filled.
    /// Fewer than two samples overall yields no windows.
    pub fn aggregate(&self, samples: &[MemorySample]) -> Vec<WindowStat> {
        if samples.len() < MIN_SAMPLES_FOR_GROWTH {
            return Vec::new();
        }

        let mut windows = Vec::new();
        let mut bucket = Bucket::Empty;

        for sample in samples {
            let key = self.bucket_key(&sample.timestamp);
            bucket = match bucket {
                Bucket::Accumulating {
                    key: open,
                    first,
                    count,
                    ..
                } if open == key => Bucket::Accumulating {
                    key: open,
                    first,
                    last: sample,
                    count: count + 1,
                },
                closed => {
                    windows.extend(closed.flush());
                    Bucket::Accumulating {
                        key,
                        first: sample,
                        last: sample,
                        count: 1,
                    }
                }
            };
        }
        windows.extend(bucket.flush());

        windows
    }
}

impl Default for WindowAggregator {
    fn default() -> Self {
        Self::hourly()
    }
}
