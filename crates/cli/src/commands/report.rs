//! Monitoring report command

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use monitor_lib::{HealthCollector, MonitoringReport, RefreshLoop, RefreshMode};
use tabled::Tabled;
use tokio::sync::broadcast;
use tracing::warn;

use crate::output::{
    color_score, color_status, format_percent, format_timestamp, print_error, print_success,
    OutputFormat,
};

/// Row for the services table
#[derive(Tabled)]
struct ServiceRow {
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
    #[tabled(rename = "Errors")]
    errors: String,
}

/// Row for the infrastructure table
#[derive(Tabled)]
struct InfrastructureRow {
    #[tabled(rename = "Component")]
    component: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Run the report command, one-shot or in watch mode.
pub async fn run(
    collector: &HealthCollector,
    format: OutputFormat,
    save: bool,
    watch: bool,
    interval: u64,
    shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let refresh = if watch {
        println!("Starting continuous monitoring (interval: {interval}s)");
        println!("Press Ctrl-C to stop...");
        RefreshLoop::new(Duration::from_secs(interval), RefreshMode::Continuous)
    } else {
        RefreshLoop::once()
    };

    refresh
        .run(shutdown, || {
            let collector = collector.clone();
            async move {
                let report = collector.collect_report().await;
                render(&report, format);

                if save {
                    match save_report(&report, Path::new(".")) {
                        Ok(path) => print_success(&format!("Report saved: {}", path.display())),
                        Err(e) => {
                            warn!(error = %e, "Failed to save report");
                            print_error(&format!("Failed to save report: {e}"));
                        }
                    }
                }
            }
        })
        .await;

    Ok(())
}

/// Render one report to the console.
pub fn render(report: &MonitoringReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(report) {
                println!("{json}");
            }
        }
        OutputFormat::Table => print_report(report),
    }
}

fn print_report(report: &MonitoringReport) {
    println!();
    println!("{}", "=".repeat(80));
    println!("{}", "FLEET MONITORING REPORT".bold());
    println!("{}", "=".repeat(80));
    println!("Project:              {}", report.project_name.cyan());
    println!("Environment:          {}", report.environment.cyan());
    println!("Region:               {}", report.region.cyan());
    println!("Timestamp:            {}", format_timestamp(&report.timestamp));
    println!(
        "Overall Health Score: {}",
        format!("{}/100", report.overall_health_score).bold()
    );

    println!();
    println!("{}", "Cluster".bold());
    println!("{}", "-".repeat(40));
    if let Some(error) = &report.cluster.error {
        println!("Error: {}", error.red());
    } else {
        println!("Name:             {}", report.cluster.name);
        println!("Status:           {}", color_status(&report.cluster.status));
        println!("Running Tasks:    {}", report.cluster.running_tasks);
        println!("Pending Tasks:    {}", report.cluster.pending_tasks);
        println!("Active Services:  {}", report.cluster.active_services);
    }

    println!();
    println!("{}", "Services".bold());
    println!("{}", "-".repeat(40));
    let rows: Vec<ServiceRow> = report
        .services
        .iter()
        .map(|s| ServiceRow {
            service: s.service_name.clone(),
            status: color_status(&s.status),
            tasks: format!("{}/{}", s.running_tasks, s.desired_tasks),
            cpu: format_percent(s.cpu_utilization),
            memory: format_percent(s.memory_utilization),
            health: color_score(s.health_score),
            errors: s.errors_count.to_string(),
        })
        .collect();
    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{table}");

    println!();
    println!("{}", "Infrastructure".bold());
    println!("{}", "-".repeat(40));
    let infra = &report.infrastructure;
    let rows = vec![
        InfrastructureRow {
            component: "Database".to_string(),
            status: color_status(&infra.database_status),
        },
        InfrastructureRow {
            component: "Cache".to_string(),
            status: color_status(&infra.cache_status),
        },
        InfrastructureRow {
            component: "Load Balancer".to_string(),
            status: color_status(&infra.load_balancer_status),
        },
        InfrastructureRow {
            component: "Response Time".to_string(),
            status: format!("{}s", infra.response_time_secs),
        },
        InfrastructureRow {
            component: "Healthy Targets".to_string(),
            status: infra.healthy_targets.to_string(),
        },
        InfrastructureRow {
            component: "Unhealthy Targets".to_string(),
            status: infra.unhealthy_targets.to_string(),
        },
    ];
    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{table}");

    println!();
    println!("{}", "Summary".bold());
    println!("{}", "-".repeat(40));
    let summary = &report.summary;
    println!("Total Services:    {}", summary.total_services);
    println!(
        "Healthy Services:  {}",
        summary.healthy_services.to_string().green()
    );
    println!(
        "Warning Services:  {}",
        summary.warning_services.to_string().yellow()
    );
    println!(
        "Critical Services: {}",
        summary.critical_services.to_string().red()
    );

    println!();
    println!("{}", "Recommendations".bold());
    println!("{}", "-".repeat(40));
    for recommendation in &report.recommendations {
        println!("  {recommendation}");
    }
    println!();
    println!("{}", "=".repeat(80));
}

/// Persist the report as a timestamped JSON file under `dir`.
pub fn save_report(report: &MonitoringReport, dir: &Path) -> Result<PathBuf> {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("fleetwatch_report_{stamp}.json"));

    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(&path, json).context("Failed to write report file")?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_lib::{
        ClusterSummary, InfrastructureHealth, ReportSummary, ServiceHealth,
    };

    fn sample_report() -> MonitoringReport {
        MonitoringReport {
            timestamp: "2026-08-30T12:00:00+00:00".to_string(),
            project_name: "demo".to_string(),
            environment: "dev".to_string(),
            region: "us-east-1".to_string(),
            cluster: ClusterSummary {
                name: "demo-cluster".to_string(),
                status: "ACTIVE".to_string(),
                running_tasks: 5,
                pending_tasks: 0,
                active_services: 5,
                error: None,
            },
            services: vec![ServiceHealth::missing("ghost")],
            infrastructure: InfrastructureHealth::unavailable(),
            overall_health_score: 0.0,
            summary: ReportSummary {
                total_services: 1,
                healthy_services: 0,
                warning_services: 0,
                critical_services: 1,
            },
            recommendations: vec!["CRITICAL: immediate attention needed for failing services"
                .to_string()],
        }
    }

    #[test]
    fn saved_report_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let report = sample_report();

        let path = save_report(&report, dir.path()).unwrap();
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("fleetwatch_report_"));

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: MonitoringReport = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.project_name, "demo");
        assert_eq!(parsed.services.len(), 1);
        assert_eq!(parsed.services[0].status, "NOT_FOUND");
        assert_eq!(parsed.summary.critical_services, 1);
    }

    #[test]
    fn rendering_a_degraded_report_does_not_panic() {
        render(&sample_report(), OutputFormat::Table);
        render(&sample_report(), OutputFormat::Json);
    }
}
