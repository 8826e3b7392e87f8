//! Health collection
//!
//! One poll cycle: fan out across the configured services, score each one,
//! fetch infrastructure status, and fold everything into a report. Every
//! external failure is logged and degraded to a zero/sentinel value so that
//! a report is always produced.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::aggregate::{aggregate, ReportMeta};
use crate::config::MonitorConfig;
use crate::models::{ClusterSummary, InfrastructureHealth, MonitoringReport, ServiceHealth};
use crate::scoring::{RawSignals, ScoringPolicy};
use crate::source::{LoadBalancerSnapshot, MetricSample, MetricSource};

/// Which utilization signal to fetch.
#[derive(Debug, Clone, Copy)]
enum UtilizationMetric {
    Cpu,
    Memory,
}

impl UtilizationMetric {
    fn label(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Memory => "memory",
        }
    }
}

/// Drives one report per poll cycle over a [`MetricSource`].
#[derive(Clone)]
pub struct HealthCollector {
    source: Arc<dyn MetricSource>,
    policy: ScoringPolicy,
    config: MonitorConfig,
}

impl HealthCollector {
    pub fn new(source: Arc<dyn MetricSource>, policy: ScoringPolicy, config: MonitorConfig) -> Self {
        Self {
            source,
            policy,
            config,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Produce a complete monitoring report. Never fails; degraded fields
    /// carry their sentinel values instead.
    pub async fn collect_report(&self) -> MonitoringReport {
        info!(project = %self.config.project_name, "Generating monitoring report");

        let cluster_name = self.config.cluster_name();
        let cluster = match self.source.describe_cluster(&cluster_name).await {
            Ok(description) => ClusterSummary {
                name: description.name,
                status: description.status,
                running_tasks: description.running_tasks,
                pending_tasks: description.pending_tasks,
                active_services: description.active_services,
                error: None,
            },
            Err(e) => {
                warn!(error = %e, cluster = %cluster_name, "Failed to describe cluster");
                ClusterSummary::unavailable(&cluster_name, e.to_string())
            }
        };

        let mut services = Vec::with_capacity(self.config.services.len());
        for service in &self.config.services {
            services.push(self.service_health(service).await);
        }

        let infrastructure = self.infrastructure_health().await;

        let meta = ReportMeta {
            project_name: self.config.project_name.clone(),
            environment: self.config.environment.clone(),
            region: self.config.region.clone(),
        };

        aggregate(&meta, cluster, services, infrastructure, Utc::now())
    }

    /// Fetch, normalize, and score one service.
    pub async fn service_health(&self, service: &str) -> ServiceHealth {
        let cluster_name = self.config.cluster_name();

        let description = match self.source.describe_service(&cluster_name, service).await {
            Ok(Some(description)) => description,
            Ok(None) => {
                warn!(service, "Service not found on the platform");
                return ServiceHealth::missing(service);
            }
            Err(e) => {
                warn!(service, error = %e, "Failed to describe service");
                return ServiceHealth::failed(service);
            }
        };

        let cpu = self.metric_or_zero(service, UtilizationMetric::Cpu).await;
        let memory = self
            .metric_or_zero(service, UtilizationMetric::Memory)
            .await;
        let errors = match self.source.error_count(service).await {
            Ok(count) => count,
            Err(e) => {
                warn!(service, error = %e, "Failed to count log errors");
                0
            }
        };

        let signals = RawSignals {
            status: description.status.clone(),
            running_tasks: description.running_count,
            desired_tasks: description.desired_count,
            cpu_utilization: cpu.average,
            memory_utilization: memory.average,
            errors_count: errors,
        };
        let scored = self.policy.score(&signals);

        ServiceHealth {
            service_name: service.to_string(),
            status: description.status,
            running_tasks: description.running_count,
            desired_tasks: description.desired_count,
            cpu_utilization: cpu.average,
            memory_utilization: memory.average,
            errors_count: errors,
            health_score: scored.score,
            last_deployment: description
                .last_deployment
                .unwrap_or_else(|| "Never".to_string()),
            issues: scored.issues,
        }
    }

    async fn metric_or_zero(&self, service: &str, metric: UtilizationMetric) -> MetricSample {
        let result = match metric {
            UtilizationMetric::Cpu => self.source.cpu_utilization(service).await,
            UtilizationMetric::Memory => self.source.memory_utilization(service).await,
        };
        match result {
            Ok(sample) => sample,
            Err(e) => {
                warn!(service, metric = metric.label(), error = %e, "Metric fetch failed, using zero");
                MetricSample::default()
            }
        }
    }

    /// Infrastructure status with per-call degradation: one unreachable
    /// dependency leaves the others intact.
    pub async fn infrastructure_health(&self) -> InfrastructureHealth {
        let database_status = match self.source.database_status().await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Failed to fetch database status");
                "error".to_string()
            }
        };

        let cache_status = match self.source.cache_status().await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Failed to fetch cache status");
                "error".to_string()
            }
        };

        let balancer = match self.source.load_balancer_health().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Failed to fetch load balancer health");
                LoadBalancerSnapshot {
                    status: "error".to_string(),
                    ..LoadBalancerSnapshot::default()
                }
            }
        };

        InfrastructureHealth {
            database_status,
            cache_status,
            load_balancer_status: balancer.status,
            response_time_secs: balancer.response_time_secs,
            healthy_targets: balancer.healthy_targets,
            unhealthy_targets: balancer.unhealthy_targets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClusterDescription, InvocationResult, ScalingTarget, ServiceDescription};
    use crate::source::LoadBalancerSnapshot;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    /// Mock source with per-call failure switches.
    #[derive(Default)]
    pub(crate) struct MockSource {
        pub fail_cluster: bool,
        pub fail_services: bool,
        pub missing_services: bool,
        pub fail_metrics: bool,
        pub fail_logs: bool,
        pub fail_infra: bool,
        pub cpu: f64,
        pub memory: f64,
        pub errors: u64,
        pub running: u32,
        pub desired: u32,
    }

    impl MockSource {
        pub fn healthy() -> Self {
            Self {
                cpu: 10.0,
                memory: 10.0,
                running: 2,
                desired: 2,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl MetricSource for MockSource {
        async fn describe_cluster(&self, name: &str) -> Result<ClusterDescription> {
            if self.fail_cluster {
                return Err(anyhow!("cluster unreachable"));
            }
            Ok(ClusterDescription {
                name: name.to_string(),
                status: "ACTIVE".to_string(),
                running_tasks: self.running,
                pending_tasks: 0,
                active_services: 5,
            })
        }

        async fn describe_service(
            &self,
            _cluster: &str,
            _service: &str,
        ) -> Result<Option<ServiceDescription>> {
            if self.fail_services {
                return Err(anyhow!("orchestration API down"));
            }
            if self.missing_services {
                return Ok(None);
            }
            Ok(Some(ServiceDescription {
                status: "ACTIVE".to_string(),
                running_count: self.running,
                desired_count: self.desired,
                last_deployment: Some("2026-08-30T10:00:00Z".to_string()),
            }))
        }

        async fn cpu_utilization(&self, _service: &str) -> Result<MetricSample> {
            if self.fail_metrics {
                return Err(anyhow!("metrics API down"));
            }
            Ok(MetricSample {
                average: self.cpu,
                maximum: self.cpu,
            })
        }

        async fn memory_utilization(&self, _service: &str) -> Result<MetricSample> {
            if self.fail_metrics {
                return Err(anyhow!("metrics API down"));
            }
            Ok(MetricSample {
                average: self.memory,
                maximum: self.memory,
            })
        }

        async fn error_count(&self, _service: &str) -> Result<u64> {
            if self.fail_logs {
                return Err(anyhow!("log API down"));
            }
            Ok(self.errors)
        }

        async fn database_status(&self) -> Result<String> {
            if self.fail_infra {
                return Err(anyhow!("database API down"));
            }
            Ok("available".to_string())
        }

        async fn cache_status(&self) -> Result<String> {
            if self.fail_infra {
                return Err(anyhow!("cache API down"));
            }
            Ok("available".to_string())
        }

        async fn load_balancer_health(&self) -> Result<LoadBalancerSnapshot> {
            if self.fail_infra {
                return Err(anyhow!("load balancer API down"));
            }
            Ok(LoadBalancerSnapshot {
                status: "active".to_string(),
                response_time_secs: 0.25,
                healthy_targets: 4,
                unhealthy_targets: 0,
            })
        }

        async fn request_rate(&self) -> Result<f64> {
            Ok(0.0)
        }

        async fn scaling_target(&self, _service: &str) -> Result<Option<ScalingTarget>> {
            Ok(None)
        }

        async fn set_scaling_target(&self, _service: &str, _min: u32, _max: u32) -> Result<()> {
            Ok(())
        }

        async fn invoke_function(
            &self,
            _function: &str,
            _payload: serde_json::Value,
        ) -> Result<InvocationResult> {
            Ok(InvocationResult {
                status_code: 200,
                body: serde_json::Value::Null,
            })
        }
    }

    fn collector(source: MockSource) -> HealthCollector {
        HealthCollector::new(
            Arc::new(source),
            ScoringPolicy::default(),
            MonitorConfig::default(),
        )
    }

    #[tokio::test]
    async fn healthy_fleet_reports_full_scores() {
        let report = collector(MockSource::healthy()).collect_report().await;

        assert_eq!(report.services.len(), 5);
        assert!(report.services.iter().all(|s| s.health_score == 100));
        assert_eq!(report.overall_health_score, 100.0);
        assert_eq!(report.summary.healthy_services, 5);
        assert_eq!(
            report.recommendations,
            vec!["All systems operating normally".to_string()]
        );
        assert_eq!(report.cluster.status, "ACTIVE");
        assert!(report.cluster.error.is_none());
    }

    #[tokio::test]
    async fn unreachable_orchestration_still_produces_a_full_report() {
        let source = MockSource {
            fail_services: true,
            ..MockSource::healthy()
        };
        let report = collector(source).collect_report().await;

        // Failures are included at score zero, never dropped.
        assert_eq!(report.services.len(), 5);
        assert!(report.services.iter().all(|s| s.status == "ERROR"));
        assert!(report.services.iter().all(|s| s.health_score == 0));
        assert!(report.services.iter().all(|s| s.errors_count == 999));
        assert_eq!(report.overall_health_score, 0.0);
        assert_eq!(report.summary.critical_services, 5);
    }

    #[tokio::test]
    async fn missing_service_is_reported_not_found() {
        let source = MockSource {
            missing_services: true,
            ..MockSource::healthy()
        };
        let health = collector(source).service_health("user-service").await;

        assert_eq!(health.status, "NOT_FOUND");
        assert_eq!(health.health_score, 0);
        assert_eq!(health.last_deployment, "Never");
    }

    #[tokio::test]
    async fn metric_failures_degrade_to_zero_and_score_normally() {
        let source = MockSource {
            fail_metrics: true,
            fail_logs: true,
            ..MockSource::healthy()
        };
        let health = collector(source).service_health("user-service").await;

        assert_eq!(health.status, "ACTIVE");
        assert_eq!(health.cpu_utilization, 0.0);
        assert_eq!(health.memory_utilization, 0.0);
        assert_eq!(health.errors_count, 0);
        // Zero-valued signals score clean.
        assert_eq!(health.health_score, 100);
    }

    #[tokio::test]
    async fn degraded_signals_lower_the_score() {
        let source = MockSource {
            cpu: 95.0,
            memory: 85.0,
            errors: 12,
            running: 1,
            desired: 2,
            ..MockSource::healthy()
        };
        let health = collector(source).service_health("user-service").await;

        // 15 (cpu) + 15 (memory) + 20 (errors) + 20 (deficit of 1)
        assert_eq!(health.health_score, 30);
        assert_eq!(
            health.issues,
            vec![
                "Task deficit".to_string(),
                "High CPU".to_string(),
                "High Memory".to_string(),
                "High error rate".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn cluster_failure_yields_degraded_summary() {
        let source = MockSource {
            fail_cluster: true,
            ..MockSource::healthy()
        };
        let report = collector(source).collect_report().await;

        assert_eq!(report.cluster.status, "UNKNOWN");
        assert!(report.cluster.error.is_some());
        // Service reporting is unaffected.
        assert_eq!(report.overall_health_score, 100.0);
    }

    #[tokio::test]
    async fn infrastructure_failure_degrades_to_error_statuses() {
        let source = MockSource {
            fail_infra: true,
            ..MockSource::healthy()
        };
        let infra = collector(source).infrastructure_health().await;

        assert_eq!(infra.database_status, "error");
        assert_eq!(infra.cache_status, "error");
        assert_eq!(infra.load_balancer_status, "error");
        assert_eq!(infra.response_time_secs, 0.0);
    }
}
