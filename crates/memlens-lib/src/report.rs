//! Report assembly
//!
//! Wires the pipeline stages together for the two data sources and returns
//! structured report data. Rendering is left to the caller.

use serde::Serialize;
use std::path::Path;

use crate::analysis::{
    summarize, GoroutineMonitor, RunSummary, TrendClassifier, WindowAggregator, WindowStat,
};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::ingest::{RecordExtractor, SampleStore, ScanStats};
use crate::live::{analyze_snapshot, LiveReport, ModuleRanker};
use crate::models::{LiveSnapshot, MemorySample};
use crate::observability::RunLogger;

/// Everything derived from one log source
#[derive(Debug, Clone, Serialize)]
pub struct LogReport {
    pub source: String,
    pub stats: ScanStats,
    pub samples: Vec<MemorySample>,
    pub windows: Vec<WindowStat>,
    /// Absent when the run is too short to express growth
    pub summary: Option<RunSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_unavailable: Option<String>,
}

/// Log pipeline: extract, store, aggregate, classify
#[derive(Debug, Clone)]
pub struct LogAnalyzer {
    extractor: RecordExtractor,
    aggregator: WindowAggregator,
    classifier: TrendClassifier,
    monitor: GoroutineMonitor,
}

impl LogAnalyzer {
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            extractor: RecordExtractor::new(config.marker.clone()),
            aggregator: WindowAggregator::new(config.bucket_width())?,
            classifier: TrendClassifier::new(config.trend),
            monitor: GoroutineMonitor::new(config.runtime),
        })
    }

    pub fn extractor(&self) -> &RecordExtractor {
        &self.extractor
    }

    /// Scan a log file and analyse its samples
    pub fn analyze_path(&self, path: impl AsRef<Path>) -> Result<LogReport> {
        let path = path.as_ref();
        let store = SampleStore::load(path, &self.extractor)?;
        self.analyze_store(path.display().to_string(), store)
    }

    /// Analyse an assembled store
    ///
    /// An empty store is [`AnalysisError::NoSamples`]. A store too short for
    /// a summary still produces a report, with the summary left out.
    pub fn analyze_store(
        &self,
        source: impl Into<String>,
        store: SampleStore,
    ) -> Result<LogReport> {
        let logger = RunLogger::new(source);
        let stats = store.stats();
        logger.log_scan_complete(&stats);

        store.require_samples()?;
        let samples = store.into_samples();

        let windows = self.aggregator.aggregate(&samples);
        if windows.is_empty() {
            logger.log_skipped("windows", "no window holds two or more samples");
        }

        let (summary, summary_unavailable) =
            match summarize(&samples, &self.classifier, &self.monitor) {
                Ok(summary) => {
                    logger.log_verdict(&summary);
                    if let Some(alert) = &summary.goroutine_alert {
                        logger.log_goroutine_alert(alert);
                    }
                    (Some(summary), None)
                }
                Err(
                    err @ (AnalysisError::InsufficientSamples { .. }
                    | AnalysisError::NonPositiveDuration { .. }),
                ) => {
                    let reason = err.to_string();
                    logger.log_skipped("summary", &reason);
                    (None, Some(reason))
                }
                Err(err) => return Err(err),
            };

        Ok(LogReport {
            source: logger.source().to_string(),
            stats,
            samples,
            windows,
            summary,
            summary_unavailable,
        })
    }
}

/// Live pipeline: rank modules, check runtime counters
#[derive(Debug, Clone, Copy)]
pub struct LiveAnalyzer {
    ranker: ModuleRanker,
    monitor: GoroutineMonitor,
}

impl LiveAnalyzer {
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ranker: ModuleRanker::new(config.modules),
            monitor: GoroutineMonitor::new(config.runtime),
        })
    }

    /// Analyse one fetched snapshot; `source` names the endpoint for logging
    pub fn analyze(&self, source: impl Into<String>, snapshot: LiveSnapshot) -> Result<LiveReport> {
        let logger = RunLogger::new(source);
        let report = analyze_snapshot(snapshot, &self.ranker, &self.monitor)?;

        logger.log_module_flags(&report.ranking);
        if let Some(alert) = &report.goroutine_alert {
            logger.log_goroutine_alert(alert);
        }

        Ok(report)
    }
}
