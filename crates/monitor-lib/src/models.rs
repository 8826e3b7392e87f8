//! Core data models for the monitoring report
//!
//! Every type here is a plain value: built once per poll cycle,
//! folded into a report, and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Platform status string for a fully operational service.
pub const ACTIVE_STATUS: &str = "ACTIVE";

/// Health snapshot for a single service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub service_name: String,
    /// Platform-reported lifecycle status (ACTIVE, DRAINING, ...) or one of
    /// the local sentinels NOT_FOUND / ERROR.
    pub status: String,
    pub running_tasks: u32,
    pub desired_tasks: u32,
    pub cpu_utilization: f64,
    pub memory_utilization: f64,
    /// ERROR-pattern log events in the lookback window.
    pub errors_count: u64,
    pub health_score: u8,
    /// ISO-8601 timestamp, or "Never" / "Error".
    pub last_deployment: String,
    pub issues: Vec<String>,
}

impl ServiceHealth {
    /// Entry for a service the platform does not know about.
    pub fn missing(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            status: "NOT_FOUND".to_string(),
            running_tasks: 0,
            desired_tasks: 0,
            cpu_utilization: 0.0,
            memory_utilization: 0.0,
            errors_count: 0,
            health_score: 0,
            last_deployment: "Never".to_string(),
            issues: vec!["Service inactive".to_string()],
        }
    }

    /// Entry for a service whose lookup failed outright.
    pub fn failed(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            status: "ERROR".to_string(),
            running_tasks: 0,
            desired_tasks: 0,
            cpu_utilization: 0.0,
            memory_utilization: 0.0,
            errors_count: 999,
            health_score: 0,
            last_deployment: "Error".to_string(),
            issues: vec!["Service inactive".to_string()],
        }
    }
}

/// Health snapshot for the shared infrastructure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfrastructureHealth {
    pub database_status: String,
    pub cache_status: String,
    pub load_balancer_status: String,
    /// Average backend response time in seconds.
    pub response_time_secs: f64,
    pub healthy_targets: u32,
    pub unhealthy_targets: u32,
}

impl InfrastructureHealth {
    pub fn unavailable() -> Self {
        Self {
            database_status: "error".to_string(),
            cache_status: "error".to_string(),
            load_balancer_status: "error".to_string(),
            response_time_secs: 0.0,
            healthy_targets: 0,
            unhealthy_targets: 0,
        }
    }
}

/// Cluster-level task and service counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub name: String,
    pub status: String,
    pub running_tasks: u32,
    pub pending_tasks: u32,
    pub active_services: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClusterSummary {
    pub fn unavailable(name: &str, error: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: "UNKNOWN".to_string(),
            running_tasks: 0,
            pending_tasks: 0,
            active_services: 0,
            error: Some(error.into()),
        }
    }
}

/// Service counts per health band
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_services: usize,
    pub healthy_services: usize,
    pub warning_services: usize,
    pub critical_services: usize,
}

/// One complete monitoring snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringReport {
    pub timestamp: String,
    pub project_name: String,
    pub environment: String,
    pub region: String,
    pub cluster: ClusterSummary,
    pub services: Vec<ServiceHealth>,
    pub infrastructure: InfrastructureHealth,
    pub overall_health_score: f64,
    pub summary: ReportSummary,
    pub recommendations: Vec<String>,
}
