//! Structured logging for analysis runs
//!
//! Every event carries an `event` key and the source it came from (a log
//! path or an endpoint URL) so runs can be correlated in JSON output.

use tracing::{info, warn};

use crate::analysis::{GoroutineAlert, RunSummary, TrendStatus};
use crate::ingest::ScanStats;
use crate::live::{FlagSeverity, ModuleRanking};

/// Structured logger for one analysis run
#[derive(Debug, Clone)]
pub struct RunLogger {
    source: String,
}

impl RunLogger {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Log the outcome of a log scan
    pub fn log_scan_complete(&self, stats: &ScanStats) {
        info!(
            event = "log_scan_complete",
            source = %self.source,
            lines_read = stats.lines_read,
            candidate_lines = stats.candidate_lines,
            samples_extracted = stats.samples_extracted,
            lines_rejected = stats.lines_rejected,
            "Log scan complete"
        );

        if stats.out_of_order > 0 {
            warn!(
                event = "samples_out_of_order",
                source = %self.source,
                out_of_order = stats.out_of_order,
                "Samples are not in chronological order; window growth may be misstated"
            );
        }
    }

    /// Log the trend verdict of a run
    pub fn log_verdict(&self, summary: &RunSummary) {
        let verdict = &summary.verdict;
        match verdict.status {
            TrendStatus::Normal => info!(
                event = "trend_classified",
                source = %self.source,
                status = %verdict.status,
                rss_growth_per_hour = verdict.rss_growth_per_hour,
                rss_growth_percent = verdict.rss_growth_percent,
                duration_hours = verdict.duration_hours,
                "Memory trend classified"
            ),
            _ => warn!(
                event = "trend_classified",
                source = %self.source,
                status = %verdict.status,
                rss_growth_per_hour = verdict.rss_growth_per_hour,
                rss_growth_percent = verdict.rss_growth_percent,
                duration_hours = verdict.duration_hours,
                rationale = %verdict.rationale,
                "Memory trend requires attention"
            ),
        }
    }

    /// Log that a dependent computation was skipped for lack of data
    pub fn log_skipped(&self, stage: &str, reason: &str) {
        warn!(
            event = "stage_skipped",
            source = %self.source,
            stage = %stage,
            reason = %reason,
            "Analysis stage skipped"
        );
    }

    /// Log every flagged module of a ranking
    pub fn log_module_flags(&self, ranking: &ModuleRanking) {
        for module in ranking.flagged() {
            let worst = module
                .flags
                .iter()
                .map(|f| f.severity())
                .max()
                .unwrap_or(FlagSeverity::Warning);
            let flags: Vec<&str> = module.flags.iter().map(|f| f.label()).collect();

            warn!(
                event = "module_flagged",
                source = %self.source,
                module = %module.record.module_name,
                layer = %module.record.layer,
                severity = ?worst,
                flags = ?flags,
                approx_bytes = module.record.approx_bytes,
                objects = module.record.object_count,
                "Module crossed memory thresholds"
            );
        }

        info!(
            event = "modules_ranked",
            source = %self.source,
            modules = ranking.modules.len(),
            flagged = ranking.flagged().count(),
            total_bytes = ranking.total_bytes,
            "Module snapshot ranked"
        );
    }

    /// Log a goroutine alert
    pub fn log_goroutine_alert(&self, alert: &GoroutineAlert) {
        warn!(
            event = "goroutine_alert",
            source = %self.source,
            alert_level = %alert.level,
            count = alert.count,
            threshold = alert.threshold,
            growth_per_minute = ?alert.growth_per_minute,
            "{}",
            alert.message()
        );
    }
}
