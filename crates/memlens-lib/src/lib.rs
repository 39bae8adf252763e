//! Memory telemetry analysis library
//!
//! This crate provides the core functionality for:
//! - Extracting memory samples from structured process logs
//! - Hourly growth windows and run-level trend classification
//! - Goroutine count and growth alerts
//! - Ranking live per-module memory snapshots

pub mod analysis;
pub mod config;
pub mod error;
pub mod ingest;
pub mod live;
pub mod models;
pub mod observability;
pub mod report;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
pub use models::*;
pub use observability::RunLogger;
pub use report::{LiveAnalyzer, LogAnalyzer, LogReport};
