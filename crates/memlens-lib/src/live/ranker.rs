//! Live per-module memory ranking
//!
//! Ranks the modules of one introspection snapshot by approximate bytes and
//! annotates each with the absolute thresholds it crosses.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use crate::config::ModuleThresholds;
use crate::error::{AnalysisError, Result};
use crate::models::ModuleMemoryRecord;

/// How serious a module flag is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagSeverity {
    Warning,
    Issue,
}

/// Threshold crossed by a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleFlag {
    HighMemory,
    ObjectCountAnomaly,
    QueueLengthAnomaly,
    CacheSizeAnomaly,
}

impl ModuleFlag {
    pub fn severity(&self) -> FlagSeverity {
        match self {
            ModuleFlag::HighMemory => FlagSeverity::Issue,
            _ => FlagSeverity::Warning,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModuleFlag::HighMemory => "high memory",
            ModuleFlag::ObjectCountAnomaly => "object count anomaly",
            ModuleFlag::QueueLengthAnomaly => "queue length anomaly",
            ModuleFlag::CacheSizeAnomaly => "cache size anomaly",
        }
    }
}

impl std::fmt::Display for ModuleFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A snapshot row with the flags it raised
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedModule {
    #[serde(flatten)]
    pub record: ModuleMemoryRecord,
    pub flags: Vec<ModuleFlag>,
}

impl RankedModule {
    pub fn is_flagged(&self) -> bool {
        !self.flags.is_empty()
    }
}

/// Modules ordered by approximate bytes, largest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleRanking {
    pub modules: Vec<RankedModule>,
    /// Sum of `approx_bytes` across the whole snapshot
    pub total_bytes: u64,
}

impl ModuleRanking {
    /// The `n` largest modules
    pub fn top(&self, n: usize) -> &[RankedModule] {
        &self.modules[..n.min(self.modules.len())]
    }

    pub fn flagged(&self) -> impl Iterator<Item = &RankedModule> {
        self.modules.iter().filter(|m| m.is_flagged())
    }
}

/// Ranks and flags module snapshots
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleRanker {
    thresholds: ModuleThresholds,
}

impl ModuleRanker {
    pub fn new(thresholds: ModuleThresholds) -> Self {
        Self { thresholds }
    }

    /// Rank a snapshot
    ///
    /// The sort is stable, so modules with equal `approx_bytes` keep their
    /// snapshot order. Duplicate module names are ranked independently. An
    /// empty snapshot is [`AnalysisError::NoModuleData`].
    pub fn rank(&self, mut snapshot: Vec<ModuleMemoryRecord>) -> Result<ModuleRanking> {
        if snapshot.is_empty() {
            return Err(AnalysisError::NoModuleData);
        }

        let total_bytes = snapshot
            .iter()
            .fold(0u64, |acc, record| acc.saturating_add(record.approx_bytes));

        snapshot.sort_by_key(|record| Reverse(record.approx_bytes));

        let modules = snapshot
            .into_iter()
            .map(|record| RankedModule {
                flags: self.flags_for(&record),
                record,
            })
            .collect();

        Ok(ModuleRanking {
            modules,
            total_bytes,
        })
    }

    /// Every threshold the record crosses, evaluated independently
    pub fn flags_for(&self, record: &ModuleMemoryRecord) -> Vec<ModuleFlag> {
        let t = &self.thresholds;
        [
            (record.approx_bytes > t.high_memory_bytes, ModuleFlag::HighMemory),
            (record.object_count > t.object_count, ModuleFlag::ObjectCountAnomaly),
            (record.queue_length > t.queue_length, ModuleFlag::QueueLengthAnomaly),
            (record.cache_item_count > t.cache_items, ModuleFlag::CacheSizeAnomaly),
        ]
        .into_iter()
        .filter_map(|(crossed, flag)| crossed.then_some(flag))
        .collect()
    }
}
