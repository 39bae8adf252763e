//! Core data models for the analysis engine

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One point-in-time memory observation reconstructed from a log line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemorySample {
    pub timestamp: DateTime<FixedOffset>,
    pub rss_mb: f64,
    pub rss_bytes: u64,
    pub heap_mb: f64,
    pub heap_alloc_bytes: u64,
    pub heap_inuse_bytes: u64,
    pub gc_count: u64,
    pub goroutine_count: u64,
    /// Opaque per-module entries; only the count is analysed
    pub modules: Vec<serde_json::Value>,
}

impl MemorySample {
    /// Sample with the given timestamp and every metric at zero
    pub fn empty(timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            timestamp,
            rss_mb: 0.0,
            rss_bytes: 0,
            heap_mb: 0.0,
            heap_alloc_bytes: 0,
            heap_inuse_bytes: 0,
            gc_count: 0,
            goroutine_count: 0,
            modules: Vec::new(),
        }
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

/// One row of a live introspection snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMemoryRecord {
    #[serde(rename = "module", default)]
    pub module_name: String,
    #[serde(default)]
    pub layer: String,
    #[serde(rename = "objects", default)]
    pub object_count: u64,
    #[serde(default)]
    pub approx_bytes: u64,
    #[serde(rename = "cache_items", default)]
    pub cache_item_count: u64,
    #[serde(default)]
    pub queue_length: u64,
}

/// Process-wide runtime counters from the live endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeStats {
    pub heap_alloc: u64,
    pub heap_inuse: u64,
    pub num_gc: u64,
    pub num_goroutine: u64,
}

/// Payload of `GET /api/v1/system/memory`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveSnapshot {
    pub runtime: RuntimeStats,
    pub modules: Vec<ModuleMemoryRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_snapshot_wire_names() {
        let json = r#"{
            "runtime": {"heap_alloc": 1024, "heap_inuse": 2048, "num_gc": 7, "num_goroutine": 42},
            "modules": [
                {"module": "mempool", "layer": "core", "objects": 10, "approx_bytes": 4096, "cache_items": 3, "queue_length": 1}
            ]
        }"#;

        let snapshot: LiveSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.runtime.num_goroutine, 42);
        assert_eq!(snapshot.modules.len(), 1);

        let module = &snapshot.modules[0];
        assert_eq!(module.module_name, "mempool");
        assert_eq!(module.object_count, 10);
        assert_eq!(module.cache_item_count, 3);
        assert_eq!(module.queue_length, 1);
    }

    #[test]
    fn test_module_fields_default_to_zero() {
        let record: ModuleMemoryRecord = serde_json::from_str(r#"{"module": "p2p"}"#).unwrap();
        assert_eq!(record.layer, "");
        assert_eq!(record.approx_bytes, 0);
        assert_eq!(record.object_count, 0);

        let snapshot: LiveSnapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.modules.is_empty());
        assert_eq!(snapshot.runtime, RuntimeStats::default());
    }
}
