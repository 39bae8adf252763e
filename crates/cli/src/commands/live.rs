//! Live module snapshot command

use anyhow::Result;
use colored::Colorize;
use memlens_lib::analysis::GoroutineAlert;
use memlens_lib::live::{FlagSeverity, RankedModule};
use memlens_lib::{AnalysisConfig, LiveAnalyzer, RuntimeStats};
use serde::Serialize;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{
    color_alert, color_severity, format_bytes, print_heading, print_json, print_table,
    OutputFormat,
};

/// Row for the modules table
#[derive(Tabled)]
struct ModuleRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Module")]
    module: String,
    #[tabled(rename = "Layer")]
    layer: String,
    #[tabled(rename = "Approx Size")]
    size: String,
    #[tabled(rename = "Share")]
    share: String,
    #[tabled(rename = "Objects")]
    objects: u64,
    #[tabled(rename = "Cache Items")]
    cache_items: u64,
    #[tabled(rename = "Queue")]
    queue: u64,
    #[tabled(rename = "Flags")]
    flags: String,
}

impl ModuleRow {
    fn new(rank: usize, module: &RankedModule, total_bytes: u64) -> Self {
        let record = &module.record;
        let share = if total_bytes > 0 {
            record.approx_bytes as f64 / total_bytes as f64 * 100.0
        } else {
            0.0
        };
        let flags = module
            .flags
            .iter()
            .map(|flag| color_severity(flag.label(), flag.severity()))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            rank,
            module: record.module_name.clone(),
            layer: record.layer.clone(),
            size: format_bytes(record.approx_bytes),
            share: format!("{:.1}%", share),
            objects: record.object_count,
            cache_items: record.cache_item_count,
            queue: record.queue_length,
            flags,
        }
    }
}

/// JSON shape of a live analysis
#[derive(Serialize)]
struct LiveOutput<'a> {
    endpoint: &'a str,
    runtime: &'a RuntimeStats,
    module_count: usize,
    total_bytes: u64,
    modules: &'a [RankedModule],
    #[serde(skip_serializing_if = "Option::is_none")]
    goroutine_alert: Option<&'a GoroutineAlert>,
}

/// Fetch one snapshot and show the largest modules
///
/// `top` limits the listing; zero lists every module.
pub async fn show_modules(
    client: &ApiClient,
    config: &AnalysisConfig,
    top: usize,
    format: OutputFormat,
) -> Result<()> {
    let analyzer = LiveAnalyzer::from_config(config)?;
    let snapshot = client.fetch_memory_snapshot().await?;
    let endpoint = client.base_url().as_str();
    let report = analyzer.analyze(endpoint, snapshot)?;

    let ranking = &report.ranking;
    let shown = if top == 0 {
        ranking.modules.as_slice()
    } else {
        ranking.top(top)
    };

    match format {
        OutputFormat::Json => {
            print_json(&LiveOutput {
                endpoint,
                runtime: &report.runtime,
                module_count: ranking.modules.len(),
                total_bytes: ranking.total_bytes,
                modules: shown,
                goroutine_alert: report.goroutine_alert.as_ref(),
            })?;
        }
        OutputFormat::Table => {
            let runtime = &report.runtime;

            print_heading("Live Memory Snapshot", 60);
            println!("Endpoint:      {}", endpoint.cyan());
            println!("Heap alloc:    {}", format_bytes(runtime.heap_alloc));
            println!("Heap in use:   {}", format_bytes(runtime.heap_inuse));
            println!("GC cycles:     {}", runtime.num_gc);
            println!("Goroutines:    {}", runtime.num_goroutine);
            if let Some(alert) = &report.goroutine_alert {
                println!("               {}", color_alert(&alert.message(), alert.level));
            }
            println!();

            println!(
                "{} (top {} of {})",
                "Modules by approximate size".bold(),
                shown.len(),
                ranking.modules.len()
            );
            let rows = shown
                .iter()
                .enumerate()
                .map(|(i, module)| ModuleRow::new(i + 1, module, ranking.total_bytes))
                .collect();
            print_table(rows);
            println!("\nTotal tracked: {}", format_bytes(ranking.total_bytes));

            let flagged: Vec<&RankedModule> = ranking.flagged().collect();
            if !flagged.is_empty() {
                println!();
                println!("{}", "Flagged modules".bold());
                for module in flagged {
                    let worst = module
                        .flags
                        .iter()
                        .map(|flag| flag.severity())
                        .max()
                        .unwrap_or(FlagSeverity::Warning);
                    let labels: Vec<&str> = module.flags.iter().map(|flag| flag.label()).collect();
                    let marker = match worst {
                        FlagSeverity::Issue => "✗",
                        FlagSeverity::Warning => "⚠",
                    };
                    println!(
                        "  {} {} ({}): {}",
                        color_severity(marker, worst),
                        module.record.module_name,
                        format_bytes(module.record.approx_bytes),
                        labels.join(", ")
                    );
                }
            }
        }
    }

    Ok(())
}
