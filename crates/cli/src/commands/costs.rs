//! Cost analysis command

use anyhow::Result;
use colored::Colorize;
use monitor_lib::ActionDispatcher;
use serde_json::json;
use tabled::Tabled;

use crate::output::{format_percent, format_timestamp, OutputFormat};

#[derive(Tabled)]
struct UtilizationRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Utilization")]
    utilization: String,
    #[tabled(rename = "Recommendation")]
    recommendation: String,
}

/// Run the cost optimizer and show its findings.
pub async fn analyze(dispatcher: &ActionDispatcher, format: OutputFormat) -> Result<()> {
    let report = dispatcher.cost_analysis().await?;

    match format {
        OutputFormat::Json => {
            let utilization: Vec<serde_json::Value> = report
                .utilization
                .iter()
                .map(|u| {
                    json!({
                        "service": u.service,
                        "cpu_avg": u.cpu_avg,
                        "memory_avg": u.memory_avg,
                        "verdict": u.verdict,
                    })
                })
                .collect();
            let payload = json!({
                "timestamp": report.timestamp,
                "estimated_monthly_savings": report.estimated_monthly_savings,
                "recommendations": report.recommendations,
                "utilization": utilization,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        OutputFormat::Table => {
            println!();
            println!("{}", "COST ANALYSIS".bold());
            println!("{}", "-".repeat(40));
            println!("Timestamp: {}", format_timestamp(&report.timestamp));
            println!(
                "Estimated monthly savings: {}",
                format!("${:.2}", report.estimated_monthly_savings)
                    .green()
                    .bold()
            );

            println!();
            println!("{}", "Recommendations".bold());
            for (i, recommendation) in report.recommendations.iter().enumerate() {
                println!("  {}. {recommendation}", i + 1);
            }

            println!();
            println!("{}", "Service Utilization".bold());
            let rows: Vec<UtilizationRow> = report
                .utilization
                .iter()
                .map(|u| UtilizationRow {
                    service: u.service.clone(),
                    utilization: format!(
                        "CPU: {}, Memory: {}",
                        format_percent(u.cpu_avg),
                        format_percent(u.memory_avg)
                    ),
                    recommendation: u.verdict.clone(),
                })
                .collect();
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{table}");
        }
    }

    Ok(())
}
