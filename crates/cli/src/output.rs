//! Output formatting utilities

use chrono::{DateTime, FixedOffset};
use clap::ValueEnum;
use colored::Colorize;
use memlens_lib::analysis::{AlertLevel, TrendStatus};
use memlens_lib::live::FlagSeverity;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print rows as a rounded table
pub fn print_table<T: Tabled>(rows: Vec<T>) {
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a section heading
pub fn print_heading(title: &str, width: usize) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(width));
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2}Gi", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2}Mi", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2}Ki", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// Format a megabyte amount
pub fn format_mb(mb: f64) -> String {
    format!("{:.2} MB", mb)
}

/// Format a signed megabyte delta
pub fn format_mb_delta(mb: f64) -> String {
    format!("{:+.2} MB", mb)
}

/// Format a signed percentage
pub fn format_percent(percent: f64) -> String {
    format!("{:+.2}%", percent)
}

/// Format a signed counter delta
pub fn format_delta(delta: i64) -> String {
    format!("{:+}", delta)
}

/// Format timestamp for display, keeping its own offset
pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S %:z").to_string()
}

/// Color a trend status
pub fn color_status(status: TrendStatus) -> String {
    let label = status.to_string().to_uppercase();
    match status {
        TrendStatus::Normal => label.green().to_string(),
        TrendStatus::Suspicious => label.yellow().to_string(),
        TrendStatus::Anomalous => label.red().bold().to_string(),
    }
}

/// Color a growth delta: growth red, shrinkage green
pub fn color_growth(text: String, value: f64) -> String {
    if value > 0.0 {
        text.red().to_string()
    } else if value < 0.0 {
        text.green().to_string()
    } else {
        text
    }
}

/// Color text by module flag severity
pub fn color_severity(text: &str, severity: FlagSeverity) -> String {
    match severity {
        FlagSeverity::Warning => text.yellow().to_string(),
        FlagSeverity::Issue => text.red().to_string(),
    }
}

/// Color text by goroutine alert level
pub fn color_alert(text: &str, level: AlertLevel) -> String {
    match level {
        AlertLevel::Warning => text.yellow().to_string(),
        AlertLevel::Critical => text.red().bold().to_string(),
    }
}
