//! Report aggregation
//!
//! Pure assembly of per-service and infrastructure snapshots into a
//! [`MonitoringReport`]. The caller supplies the timestamp so this layer
//! stays free of wall-clock reads.

use chrono::{DateTime, Utc};

use crate::models::{
    ClusterSummary, InfrastructureHealth, MonitoringReport, ReportSummary, ServiceHealth,
};

/// Lower bound of the healthy band.
pub const HEALTHY_THRESHOLD: u8 = 80;
/// Lower bound of the warning band; everything below is critical.
pub const WARNING_THRESHOLD: u8 = 60;

/// Utilization percentage above which a per-service recommendation fires.
const UTILIZATION_ALERT_THRESHOLD: f64 = 80.0;
/// Error count above which a per-service recommendation fires.
const ERROR_ALERT_THRESHOLD: u64 = 10;
/// Load-balancer response time (seconds) above which a recommendation fires.
const RESPONSE_TIME_ALERT_SECS: f64 = 1.0;

/// Report identity fields, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub project_name: String,
    pub environment: String,
    pub region: String,
}

/// Combine the pieces of one poll cycle into an immutable report.
///
/// The overall score is the arithmetic mean over exactly `services.len()`
/// entries; failed services contribute their zero scores rather than being
/// dropped from the denominator.
pub fn aggregate(
    meta: &ReportMeta,
    cluster: ClusterSummary,
    services: Vec<ServiceHealth>,
    infrastructure: InfrastructureHealth,
    timestamp: DateTime<Utc>,
) -> MonitoringReport {
    let overall_health_score = if services.is_empty() {
        0.0
    } else {
        let total: u32 = services.iter().map(|s| u32::from(s.health_score)).sum();
        round2(f64::from(total) / services.len() as f64)
    };

    let mut summary = ReportSummary {
        total_services: services.len(),
        healthy_services: 0,
        warning_services: 0,
        critical_services: 0,
    };
    for service in &services {
        if service.health_score >= HEALTHY_THRESHOLD {
            summary.healthy_services += 1;
        } else if service.health_score >= WARNING_THRESHOLD {
            summary.warning_services += 1;
        } else {
            summary.critical_services += 1;
        }
    }

    let recommendations = recommendations(&summary, &services, &infrastructure);

    MonitoringReport {
        timestamp: timestamp.to_rfc3339(),
        project_name: meta.project_name.clone(),
        environment: meta.environment.clone(),
        region: meta.region.clone(),
        cluster,
        services,
        infrastructure,
        overall_health_score,
        summary,
        recommendations,
    }
}

/// Rule-based advisory text. System-wide rules fire first, then per-service
/// rules in service iteration order.
fn recommendations(
    summary: &ReportSummary,
    services: &[ServiceHealth],
    infrastructure: &InfrastructureHealth,
) -> Vec<String> {
    let mut out = Vec::new();

    if summary.critical_services > 0 {
        out.push("CRITICAL: immediate attention needed for failing services".to_string());
    }
    if summary.warning_services > 0 {
        out.push("WARNING: monitor services with degraded performance".to_string());
    }
    if infrastructure.unhealthy_targets > 0 {
        out.push("Check load balancer target health".to_string());
    }
    if infrastructure.response_time_secs > RESPONSE_TIME_ALERT_SECS {
        out.push("Optimize application response time".to_string());
    }

    for service in services {
        if service.cpu_utilization > UTILIZATION_ALERT_THRESHOLD {
            out.push(format!(
                "Scale up {} - high CPU usage",
                service.service_name
            ));
        }
        if service.memory_utilization > UTILIZATION_ALERT_THRESHOLD {
            out.push(format!(
                "Scale up {} - high memory usage",
                service.service_name
            ));
        }
        if service.errors_count > ERROR_ALERT_THRESHOLD {
            out.push(format!(
                "Check {} logs - high error rate",
                service.service_name
            ));
        }
    }

    if out.is_empty() {
        out.push("All systems operating normally".to_string());
    }

    out
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
