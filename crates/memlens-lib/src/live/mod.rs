//! Live snapshot analysis
//!
//! Works on one payload fetched from the running process. Nothing is kept
//! between fetches.

mod ranker;

pub use ranker::{FlagSeverity, ModuleFlag, ModuleRanker, ModuleRanking, RankedModule};

use serde::Serialize;

use crate::analysis::{GoroutineAlert, GoroutineMonitor};
use crate::error::Result;
use crate::models::{LiveSnapshot, RuntimeStats};

/// Structured result of analysing one live snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveReport {
    pub runtime: RuntimeStats,
    pub ranking: ModuleRanking,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goroutine_alert: Option<GoroutineAlert>,
}

/// Rank the snapshot's modules and check its goroutine count
///
/// Fails with `NoModuleData` when the snapshot has no modules yet.
pub fn analyze_snapshot(
    snapshot: LiveSnapshot,
    ranker: &ModuleRanker,
    monitor: &GoroutineMonitor,
) -> Result<LiveReport> {
    let runtime = snapshot.runtime;
    let ranking = ranker.rank(snapshot.modules)?;

    Ok(LiveReport {
        goroutine_alert: monitor.check_count(runtime.num_goroutine),
        runtime,
        ranking,
    })
}
