//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
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
#[allow(dead_code)]
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a utilization percentage
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Color a health score by band
pub fn color_score(score: u8) -> String {
    let formatted = format!("{}/100", score);
    if score >= 80 {
        formatted.green().to_string()
    } else if score >= 60 {
        formatted.yellow().to_string()
    } else {
        formatted.red().to_string()
    }
}

/// Color a lifecycle/infrastructure status string
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "active" | "available" | "running" | "healthy" => status.green().to_string(),
        "draining" | "modifying" | "pending" | "provisioning" | "degraded" => {
            status.yellow().to_string()
        }
        "error" | "not_found" | "unhealthy" | "failed" | "unknown" => status.red().to_string(),
        _ => status.to_string(),
    }
}

/// Overall system health label for the dashboard footer
pub fn health_label(overall: f64) -> String {
    if overall >= 80.0 {
        "EXCELLENT".green().bold().to_string()
    } else if overall >= 60.0 {
        "GOOD".yellow().bold().to_string()
    } else {
        "NEEDS ATTENTION".red().bold().to_string()
    }
}

/// Format a timestamp for display
pub fn format_timestamp(ts: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(ts) {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        ts.to_string()
    }
}
