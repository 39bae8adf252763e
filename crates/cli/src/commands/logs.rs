//! Log file analysis command

use anyhow::Result;
use colored::Colorize;
use memlens_lib::analysis::{RunSummary, WindowStat};
use memlens_lib::ingest::ScanStats;
use memlens_lib::{AnalysisConfig, LogAnalyzer, LogReport};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use crate::export;
use crate::output::{
    color_alert, color_growth, color_status, format_delta, format_mb, format_mb_delta,
    format_percent, format_timestamp, print_heading, print_info, print_json, print_success,
    print_table, print_warning, OutputFormat,
};

/// Row for the windows table
#[derive(Tabled)]
struct WindowRow {
    #[tabled(rename = "Window")]
    window: String,
    #[tabled(rename = "Samples")]
    samples: usize,
    #[tabled(rename = "RSS Start")]
    rss_start: String,
    #[tabled(rename = "RSS End")]
    rss_end: String,
    #[tabled(rename = "Growth")]
    growth: String,
    #[tabled(rename = "Growth %")]
    growth_percent: String,
    #[tabled(rename = "Heap Δ")]
    heap: String,
    #[tabled(rename = "GC Δ")]
    gc: String,
    #[tabled(rename = "Goroutines Δ")]
    goroutines: String,
}

impl From<&WindowStat> for WindowRow {
    fn from(w: &WindowStat) -> Self {
        Self {
            window: format_timestamp(&w.window_start),
            samples: w.sample_count,
            rss_start: format_mb(w.rss_start_mb),
            rss_end: format_mb(w.rss_end_mb),
            growth: color_growth(format_mb_delta(w.rss_growth_mb), w.rss_growth_mb),
            growth_percent: format_percent(w.rss_growth_percent),
            heap: format_mb_delta(w.heap_growth_mb),
            gc: format_delta(w.gc_growth),
            goroutines: format_delta(w.goroutine_growth),
        }
    }
}

/// JSON shape of a log analysis; samples go through `--export` instead
#[derive(Serialize)]
struct LogOutput<'a> {
    source: &'a str,
    stats: &'a ScanStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a RunSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary_unavailable: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    windows: Option<&'a [WindowStat]>,
}

/// Analyze the memory samples in a log file
pub fn analyze_log(
    config: &AnalysisConfig,
    log: &Path,
    export_path: Option<&Path>,
    show_windows: bool,
    format: OutputFormat,
) -> Result<()> {
    let analyzer = LogAnalyzer::from_config(config)?;
    let report = analyzer.analyze_path(log)?;

    let exported = match export_path {
        Some(path) => Some((path, export::export_samples(&report.samples, path)?)),
        None => None,
    };

    match format {
        OutputFormat::Json => {
            print_json(&LogOutput {
                source: &report.source,
                stats: &report.stats,
                summary: report.summary.as_ref(),
                summary_unavailable: report.summary_unavailable.as_deref(),
                windows: show_windows.then_some(report.windows.as_slice()),
            })?;
        }
        OutputFormat::Table => {
            print_report(&report, show_windows);
            if let Some((path, rows)) = exported {
                println!();
                print_success(&format!("Exported {} samples to {}", rows, path.display()));
            }
        }
    }

    Ok(())
}

fn print_report(report: &LogReport, show_windows: bool) {
    let stats = &report.stats;

    print_heading("Memory Log Analysis", 60);
    println!("Source:        {}", report.source.cyan());
    println!("Lines read:    {}", stats.lines_read);
    println!("Samples:       {}", stats.samples_extracted);
    if stats.lines_rejected > 0 {
        println!("Rejected:      {}", stats.lines_rejected);
    }
    if stats.out_of_order > 0 {
        print_warning(&format!(
            "{} samples are out of chronological order",
            stats.out_of_order
        ));
    }
    println!();

    match (&report.summary, &report.summary_unavailable) {
        (Some(summary), _) => print_summary(summary),
        (None, Some(reason)) => print_warning(&format!("Summary skipped: {}", reason)),
        (None, None) => {}
    }

    if !show_windows {
        return;
    }

    println!();
    println!("{}", "Hourly Windows".bold());
    println!("{}", "-".repeat(60));
    if report.windows.is_empty() {
        print_info("No window holds two or more samples");
        return;
    }
    print_table(report.windows.iter().map(WindowRow::from).collect());
    println!("\nTotal: {} windows", report.windows.len());
}

fn print_summary(summary: &RunSummary) {
    println!("{}", "Run Summary".bold());
    println!("{}", "-".repeat(60));
    println!(
        "Period:        {} → {}",
        format_timestamp(&summary.started_at),
        format_timestamp(&summary.ended_at)
    );
    println!(
        "Duration:      {:.2} h ({} samples, every {:.0}s on average)",
        summary.duration_hours, summary.sample_count, summary.sampling_interval_secs
    );
    println!(
        "RSS:           {} → {} ({}, {})",
        format_mb(summary.rss_start_mb),
        format_mb(summary.rss_end_mb),
        color_growth(format_mb_delta(summary.rss_growth_mb), summary.rss_growth_mb),
        format_percent(summary.rss_growth_percent)
    );
    println!("RSS rate:      {:+.2} MB/h", summary.rss_growth_per_hour);
    println!(
        "Heap:          {} → {} ({})",
        format_mb(summary.heap_start_mb),
        format_mb(summary.heap_end_mb),
        format_mb_delta(summary.heap_growth_mb)
    );
    println!(
        "GC cycles:     {} → {} ({})",
        summary.gc_start,
        summary.gc_end,
        format_delta(summary.gc_growth)
    );
    println!(
        "Goroutines:    {} → {} ({})",
        summary.goroutines_start,
        summary.goroutines_end,
        format_delta(summary.goroutine_growth)
    );
    println!();
    println!(
        "Verdict:       {} {}",
        color_status(summary.verdict.status),
        summary.verdict.status.description()
    );

    if let Some(alert) = &summary.goroutine_alert {
        println!(
            "Goroutines:    {}",
            color_alert(&alert.message(), alert.level)
        );
    }
}
