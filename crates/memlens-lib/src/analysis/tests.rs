//! Tests for window aggregation, trend classification and run summaries

#[cfg(test)]
mod aggregation_tests {
    use crate::analysis::{
        summarize, GoroutineMonitor, TrendClassifier, TrendStatus, WindowAggregator,
    };
    use crate::error::AnalysisError;
    use crate::models::MemorySample;
    use chrono::{DateTime, Duration, FixedOffset};

    const MB: u64 = 1024 * 1024;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn t0() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2025-12-05T10:00:00+08:00").unwrap()
    }

    fn sample_at(minutes: i64, rss_mb: f64) -> MemorySample {
        MemorySample {
            rss_mb,
            ..MemorySample::empty(t0() + Duration::minutes(minutes))
        }
    }

    #[test]
    fn test_boundary_crossing_drops_lonely_bucket() {
        let samples = vec![
            sample_at(0, 100.0),
            sample_at(30, 105.0),
            sample_at(90, 120.0),
        ];

        let windows = WindowAggregator::hourly().aggregate(&samples);

        assert_eq!(windows.len(), 1);
        let first = &windows[0];
        assert_eq!(first.window_start, t0());
        assert_eq!(first.rss_start_mb, 100.0);
        assert_eq!(first.rss_end_mb, 105.0);
        assert_eq!(first.rss_growth_mb, 5.0);
        assert_close(first.rss_growth_percent, 5.0);
        assert_eq!(first.sample_count, 2);
    }

    #[test]
    fn test_single_sample_yields_nothing() {
        let samples = vec![sample_at(0, 100.0)];

        assert!(WindowAggregator::hourly().aggregate(&samples).is_empty());
        assert!(WindowAggregator::hourly().aggregate(&[]).is_empty());
        assert!(matches!(
            TrendClassifier::default().classify_run(&samples),
            Err(AnalysisError::InsufficientSamples { found: 1 })
        ));
    }

    #[test]
    fn test_one_hour_gives_at_most_one_window() {
        let samples: Vec<MemorySample> = (0..12)
            .map(|i| sample_at(i * 5, 100.0 + i as f64))
            .collect();

        let windows = WindowAggregator::hourly().aggregate(&samples);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].sample_count, 12);
        assert_eq!(windows[0].rss_growth_mb, 11.0);
    }

    #[test]
    fn test_first_last_not_min_max() {
        // Peak in the middle of the hour does not count as growth
        let samples = vec![
            sample_at(0, 200.0),
            sample_at(20, 400.0),
            sample_at(40, 150.0),
            sample_at(50, 190.0),
        ];

        let windows = WindowAggregator::hourly().aggregate(&samples);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].rss_start_mb, 200.0);
        assert_eq!(windows[0].rss_end_mb, 190.0);
        assert_eq!(windows[0].rss_growth_mb, -10.0);
        assert_close(windows[0].rss_growth_percent, -5.0);
    }

    #[test]
    fn test_windows_chronological_with_gaps_skipped() {
        let samples = vec![
            sample_at(0, 100.0),
            sample_at(50, 110.0),
            // 11:00 bucket has a single sample
            sample_at(70, 120.0),
            // 12:00 bucket is empty, 13:00 has two
            sample_at(190, 130.0),
            sample_at(230, 145.0),
        ];

        let windows = WindowAggregator::hourly().aggregate(&samples);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].window_start, t0());
        assert_eq!(windows[1].window_start, t0() + Duration::hours(3));
        assert_eq!(windows[1].rss_growth_mb, 15.0);
        assert!(windows[0].window_start < windows[1].window_start);
    }

    #[test]
    fn test_window_counter_deltas() {
        let mut first = sample_at(0, 100.0);
        first.heap_alloc_bytes = 64 * MB;
        first.gc_count = 10;
        first.goroutine_count = 300;
        let mut last = sample_at(45, 100.0);
        last.heap_alloc_bytes = 48 * MB;
        last.gc_count = 25;
        last.goroutine_count = 280;

        let windows = WindowAggregator::hourly().aggregate(&[first, last]);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].heap_growth_mb, -16.0);
        assert_eq!(windows[0].gc_growth, 15);
        assert_eq!(windows[0].goroutine_growth, -20);
        assert_eq!(windows[0].rss_growth_percent, 0.0);
    }

    #[test]
    fn test_zero_rss_baseline_window() {
        let samples = vec![sample_at(0, 0.0), sample_at(10, 25.0)];
        let windows = WindowAggregator::hourly().aggregate(&samples);
        assert_eq!(windows[0].rss_growth_mb, 25.0);
        assert_eq!(windows[0].rss_growth_percent, 0.0);
    }

    #[test]
    fn test_reaggregating_window_bounds_is_deterministic() {
        let samples: Vec<MemorySample> = (0..30)
            .map(|i| sample_at(i * 10, 100.0 + (i * i) as f64 * 0.5))
            .collect();
        let aggregator = WindowAggregator::hourly();
        let windows = aggregator.aggregate(&samples);
        assert_eq!(windows, aggregator.aggregate(&samples));

        // Each window's first and last samples alone reproduce its growth
        for window in &windows {
            let in_bucket: Vec<&MemorySample> = samples
                .iter()
                .filter(|s| aggregator.bucket_key(&s.timestamp) == window.window_start)
                .collect();
            let bounds = vec![
                (*in_bucket[0]).clone(),
                (*in_bucket[in_bucket.len() - 1]).clone(),
            ];
            let again = aggregator.aggregate(&bounds);
            assert_eq!(again.len(), 1);
            assert_eq!(again[0].rss_growth_mb, window.rss_growth_mb);
            assert_eq!(again[0].rss_growth_percent, window.rss_growth_percent);
            assert_eq!(again[0].window_start, window.window_start);
        }
    }

    #[test]
    fn test_classification_monotonic_in_rate() {
        let classifier = TrendClassifier::default();
        for percent in [0.0, 1.0, 1.99, 2.0, 3.5, 4.99, 5.0, 9.0] {
            let mut previous = TrendStatus::Normal;
            for step in 0..200 {
                let rate = -10.0 + step as f64 * 0.5;
                let status = classifier.status_for(rate, percent);
                assert!(status >= previous, "rate {rate} percent {percent}");
                previous = status;
            }
        }
    }

    #[test]
    fn test_summary_fields() {
        let mut first = sample_at(0, 500.0);
        first.heap_mb = 200.0;
        first.heap_alloc_bytes = 200 * MB;
        first.gc_count = 4;
        first.goroutine_count = 150;
        let middle = sample_at(60, 505.0);
        let mut last = sample_at(120, 530.0);
        last.heap_mb = 210.0;
        last.heap_alloc_bytes = 210 * MB;
        last.gc_count = 40;
        last.goroutine_count = 180;

        let summary = summarize(
            &[first, middle, last],
            &TrendClassifier::default(),
            &GoroutineMonitor::default(),
        )
        .unwrap();

        assert_eq!(summary.sample_count, 3);
        assert_eq!(summary.duration_hours, 2.0);
        assert_eq!(summary.sampling_interval_secs, 2400.0);
        assert_eq!(summary.rss_growth_mb, 30.0);
        assert_eq!(summary.rss_growth_per_hour, 15.0);
        assert_close(summary.rss_growth_percent, 6.0);
        assert_eq!(summary.heap_growth_mb, 10.0);
        assert_eq!(summary.gc_growth, 36);
        assert_eq!(summary.goroutine_growth, 30);
        assert_eq!(summary.verdict.status, TrendStatus::Anomalous);
        assert!(summary.goroutine_alert.is_none());
    }

    #[test]
    fn test_summary_requires_positive_span() {
        let samples = vec![sample_at(0, 100.0), sample_at(0, 110.0)];
        assert!(matches!(
            summarize(
                &samples,
                &TrendClassifier::default(),
                &GoroutineMonitor::default()
            ),
            Err(AnalysisError::NonPositiveDuration { .. })
        ));
    }
}
