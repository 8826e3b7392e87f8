//! Per-service health check command

use anyhow::Result;
use monitor_lib::{HealthCollector, ServiceHealth};
use serde_json::json;
use tabled::Tabled;

use crate::output::{color_score, color_status, OutputFormat};

#[derive(Tabled)]
struct HealthRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Issues")]
    issues: String,
    #[tabled(rename = "Recommendation")]
    recommendation: String,
}

/// Show every service with its detected issues and a remediation hint.
pub async fn run(collector: &HealthCollector, format: OutputFormat) -> Result<()> {
    let report = collector.collect_report().await;

    match format {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = report
                .services
                .iter()
                .map(|s| {
                    json!({
                        "service": s.service_name,
                        "status": s.status,
                        "score": s.health_score,
                        "issues": s.issues,
                        "recommendation": recommendation_for(s),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Table => {
            let rows: Vec<HealthRow> = report
                .services
                .iter()
                .map(|s| HealthRow {
                    service: s.service_name.clone(),
                    status: color_status(&s.status),
                    score: color_score(s.health_score),
                    issues: s.issues.join(", "),
                    recommendation: recommendation_for(s).to_string(),
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

/// Remediation hint for the most severe issue a service carries.
fn recommendation_for(service: &ServiceHealth) -> &'static str {
    for issue in &service.issues {
        match issue.as_str() {
            "Service inactive" => return "Restart service",
            "Task deficit" => return "Check logs",
            "High CPU" => return "Scale up",
            "High Memory" => return "Optimize memory",
            "High error rate" => return "Check logs",
            _ => {}
        }
    }
    "None"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_with_issues(issues: &[&str]) -> ServiceHealth {
        ServiceHealth {
            service_name: "api-gateway".to_string(),
            status: "ACTIVE".to_string(),
            running_tasks: 2,
            desired_tasks: 2,
            cpu_utilization: 50.0,
            memory_utilization: 50.0,
            errors_count: 0,
            health_score: 70,
            last_deployment: "2026-08-30".to_string(),
            issues: issues.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn hints_follow_issue_severity_order() {
        assert_eq!(
            recommendation_for(&service_with_issues(&["Service inactive", "High CPU"])),
            "Restart service"
        );
        assert_eq!(
            recommendation_for(&service_with_issues(&["High CPU"])),
            "Scale up"
        );
        assert_eq!(
            recommendation_for(&service_with_issues(&["High Memory"])),
            "Optimize memory"
        );
        assert_eq!(
            recommendation_for(&service_with_issues(&["High error rate"])),
            "Check logs"
        );
    }

    #[test]
    fn healthy_services_get_no_hint() {
        assert_eq!(recommendation_for(&service_with_issues(&["None"])), "None");
        assert_eq!(recommendation_for(&service_with_issues(&[])), "None");
    }
}
