//! Live-refreshing dashboard command

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use monitor_lib::{HealthCollector, MonitoringReport, RefreshLoop, RefreshMode};
use tabled::Tabled;
use tokio::sync::broadcast;

use crate::output::{color_score, color_status, format_percent, format_timestamp, health_label};

#[derive(Tabled)]
struct DashboardRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Tasks")]
    tasks: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Health")]
    health: String,
}

/// Redraw the dashboard every `interval` seconds until Ctrl-C.
pub async fn run(
    collector: &HealthCollector,
    interval: u64,
    shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let refresh = RefreshLoop::new(Duration::from_secs(interval), RefreshMode::Continuous);

    refresh
        .run(shutdown, || {
            let collector = collector.clone();
            async move {
                let report = collector.collect_report().await;
                draw(&report, interval);
            }
        })
        .await;

    println!();
    println!("Dashboard stopped.");
    Ok(())
}

fn draw(report: &MonitoringReport, interval: u64) {
    // ANSI clear screen + cursor home, full redraw each cycle.
    print!("\x1B[2J\x1B[1;1H");

    println!(
        "{} - {}",
        "LIVE DASHBOARD".bold(),
        format_timestamp(&report.timestamp)
    );
    println!(
        "{} / {} / {}",
        report.project_name.cyan(),
        report.environment.cyan(),
        report.region.cyan()
    );
    println!();

    let rows: Vec<DashboardRow> = report
        .services
        .iter()
        .map(|s| DashboardRow {
            service: s.service_name.clone(),
            status: color_status(&s.status),
            tasks: format!("{}/{}", s.running_tasks, s.desired_tasks),
            cpu: format_percent(s.cpu_utilization),
            memory: format_percent(s.memory_utilization),
            health: color_score(s.health_score),
        })
        .collect();
    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{table}");

    println!();
    println!(
        "Overall: {}/100 - {}",
        report.overall_health_score,
        health_label(report.overall_health_score)
    );
    println!();
    println!("Refreshing every {interval}s. Press Ctrl-C to stop.");
}
