//! Export of extracted samples for external plotting

use anyhow::{Context, Result};
use memlens_lib::MemorySample;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const CSV_HEADER: &str =
    "timestamp,rss_mb,rss_bytes,heap_mb,heap_alloc_bytes,heap_inuse_bytes,gc,goroutines,modules";

/// Flat per-sample row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRow {
    pub timestamp: String,
    pub rss_mb: f64,
    pub rss_bytes: u64,
    pub heap_mb: f64,
    pub heap_alloc_bytes: u64,
    pub heap_inuse_bytes: u64,
    pub gc: u64,
    pub goroutines: u64,
    pub modules: usize,
}

impl From<&MemorySample> for SampleRow {
    fn from(sample: &MemorySample) -> Self {
        Self {
            timestamp: sample.timestamp.to_rfc3339(),
            rss_mb: sample.rss_mb,
            rss_bytes: sample.rss_bytes,
            heap_mb: sample.heap_mb,
            heap_alloc_bytes: sample.heap_alloc_bytes,
            heap_inuse_bytes: sample.heap_inuse_bytes,
            gc: sample.gc_count,
            goroutines: sample.goroutine_count,
            modules: sample.module_count(),
        }
    }
}

/// Export file format, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }
}

/// Write samples to `path`, returning the number of rows written
pub fn export_samples(samples: &[MemorySample], path: &Path) -> Result<usize> {
    let rows: Vec<SampleRow> = samples.iter().map(SampleRow::from).collect();

    let file = File::create(path)
        .with_context(|| format!("Failed to create export file {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    match ExportFormat::from_path(path) {
        ExportFormat::Csv => write_csv(&rows, &mut writer)?,
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &rows)
                .context("Failed to write JSON export")?;
            writeln!(writer)?;
        }
    }
    writer.flush().context("Failed to flush export file")?;

    Ok(rows.len())
}

/// Write rows as CSV; every field is numeric or an RFC 3339 timestamp
pub fn write_csv<W: Write>(rows: &[SampleRow], writer: &mut W) -> Result<()> {
    writeln!(writer, "{}", CSV_HEADER)?;
    for row in rows {
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{}",
            row.timestamp,
            row.rss_mb,
            row.rss_bytes,
            row.heap_mb,
            row.heap_alloc_bytes,
            row.heap_inuse_bytes,
            row.gc,
            row.goroutines,
            row.modules
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn sample() -> MemorySample {
        let ts = DateTime::parse_from_rfc3339("2025-12-05T10:00:00+08:00").unwrap();
        MemorySample {
            rss_mb: 512.5,
            rss_bytes: 537_395_200,
            heap_mb: 128.0,
            gc_count: 42,
            goroutine_count: 310,
            modules: vec![serde_json::json!({"module": "mempool"})],
            ..MemorySample::empty(ts)
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("out.csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("OUT.CSV")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("out.json")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("out")), ExportFormat::Json);
    }

    #[test]
    fn test_write_csv() {
        let rows = vec![SampleRow::from(&sample())];
        let mut buf = Vec::new();
        write_csv(&rows, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "2025-12-05T10:00:00+08:00,512.5,537395200,128,0,0,42,310,1"
        );
    }

    #[test]
    fn test_export_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.json");

        let written = export_samples(&[sample(), sample()], &path).unwrap();
        assert_eq!(written, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[0]["goroutines"], 310);
        assert_eq!(parsed[0]["timestamp"], "2025-12-05T10:00:00+08:00");
    }

    #[test]
    fn test_export_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.csv");

        export_samples(&[sample()], &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("timestamp,rss_mb"));
        assert_eq!(content.lines().count(), 2);
    }
}
