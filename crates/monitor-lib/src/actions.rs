//! Operator actions
//!
//! Thin pass-throughs to the external load-test orchestrator, cost
//! optimizer, and autoscaling APIs. Operator-supplied parameters are
//! validated locally before any remote call; a violation aborts only the
//! requested action.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::MonitorConfig;
use crate::source::MetricSource;

/// Seconds between request-rate samples while a load test runs.
pub const LOAD_TEST_POLL_SECS: u64 = 30;

const MIN_RPS: u32 = 10;
const MAX_RPS: u32 = 1000;
const MIN_DURATION_MINS: u32 = 1;
const MAX_DURATION_MINS: u32 = 60;

/// Utilization below which a service is a downsizing candidate.
const DOWNSIZE_CPU_THRESHOLD: f64 = 20.0;
/// Utilization above which a service should scale up.
const SCALE_UP_CPU_THRESHOLD: f64 = 80.0;

/// Invalid operator input, detected before any external call.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("target rps must be between {MIN_RPS} and {MAX_RPS}, got {0}")]
    InvalidRps(u32),
    #[error("duration must be between {MIN_DURATION_MINS} and {MAX_DURATION_MINS} minutes, got {0}")]
    InvalidDuration(u32),
    #[error("minimum capacity {min} must be less than maximum capacity {max}")]
    InvalidCapacity { min: u32, max: u32 },
    #[error("unknown service: {0}")]
    UnknownService(String),
}

/// Load test parameters.
#[derive(Debug, Clone, Copy)]
pub struct LoadTestRequest {
    pub target_rps: u32,
    pub duration_mins: u32,
}

impl LoadTestRequest {
    pub fn validate(&self) -> Result<(), ActionError> {
        if !(MIN_RPS..=MAX_RPS).contains(&self.target_rps) {
            return Err(ActionError::InvalidRps(self.target_rps));
        }
        if !(MIN_DURATION_MINS..=MAX_DURATION_MINS).contains(&self.duration_mins) {
            return Err(ActionError::InvalidDuration(self.duration_mins));
        }
        Ok(())
    }
}

/// One progress sample while monitoring a load test.
#[derive(Debug, Clone, Copy)]
pub struct LoadTestProgress {
    pub current_rps: f64,
    pub elapsed_secs: u64,
    pub remaining_secs: u64,
    pub percent_complete: f64,
}

/// Cost-optimizer output plus local utilization verdicts.
#[derive(Debug, Clone)]
pub struct CostReport {
    pub timestamp: String,
    pub estimated_monthly_savings: f64,
    pub recommendations: Vec<String>,
    pub utilization: Vec<UtilizationVerdict>,
}

#[derive(Debug, Clone)]
pub struct UtilizationVerdict {
    pub service: String,
    pub cpu_avg: f64,
    pub memory_avg: f64,
    pub verdict: String,
}

/// Autoscaling state for one service.
#[derive(Debug, Clone)]
pub struct ServiceScalingTarget {
    pub service: String,
    pub min_capacity: Option<u32>,
    pub max_capacity: Option<u32>,
    pub running_tasks: u32,
}

#[derive(Debug, Deserialize)]
struct CostAnalysisPayload {
    timestamp: String,
    estimated_savings: f64,
    recommendations: Vec<String>,
}

/// Dispatches operator commands to the external workflow APIs.
#[derive(Clone)]
pub struct ActionDispatcher {
    source: Arc<dyn MetricSource>,
    config: MonitorConfig,
}

impl ActionDispatcher {
    pub fn new(source: Arc<dyn MetricSource>, config: MonitorConfig) -> Self {
        Self { source, config }
    }

    /// Kick off a load test via the external orchestrator function.
    pub async fn start_load_test(&self, request: &LoadTestRequest) -> Result<()> {
        request.validate()?;

        let function = format!("{}-load-test-orchestrator", self.config.project_name);
        let payload = json!({
            "action": "run",
            "target_rps": request.target_rps,
            "duration": request.duration_mins,
        });

        let result = self.source.invoke_function(&function, payload).await?;
        if result.status_code != 200 {
            bail!(
                "load test orchestrator returned {}: {}",
                result.status_code,
                result.body
            );
        }

        info!(
            target_rps = request.target_rps,
            duration_mins = request.duration_mins,
            "Load test started"
        );
        Ok(())
    }

    /// Sample the load-balancer request rate every [`LOAD_TEST_POLL_SECS`]
    /// for the declared duration, reporting progress through the callback.
    /// The wait between samples is interruptible.
    pub async fn monitor_load_test(
        &self,
        duration_mins: u32,
        mut shutdown: broadcast::Receiver<()>,
        mut on_progress: impl FnMut(LoadTestProgress),
    ) -> Result<()> {
        let total_secs = u64::from(duration_mins) * 60;
        let mut elapsed_secs = 0u64;

        loop {
            let current_rps = match self.source.request_rate().await {
                Ok(rate) => rate,
                Err(e) => {
                    warn!(error = %e, "Failed to sample request rate");
                    0.0
                }
            };

            on_progress(LoadTestProgress {
                current_rps,
                elapsed_secs,
                remaining_secs: total_secs - elapsed_secs,
                percent_complete: if total_secs == 0 {
                    100.0
                } else {
                    elapsed_secs as f64 / total_secs as f64 * 100.0
                },
            });

            if elapsed_secs >= total_secs {
                break;
            }

            let step = LOAD_TEST_POLL_SECS.min(total_secs - elapsed_secs);
            tokio::select! {
                _ = sleep(Duration::from_secs(step)) => {}
                _ = shutdown.recv() => {
                    info!("Load test monitoring cancelled");
                    break;
                }
            }
            elapsed_secs += step;
        }

        Ok(())
    }

    /// Invoke the cost optimizer and relay its recommendations, supplemented
    /// with per-service utilization verdicts.
    pub async fn cost_analysis(&self) -> Result<CostReport> {
        let function = format!("{}-cost-optimizer", self.config.project_name);
        let result = self.source.invoke_function(&function, json!({})).await?;

        if result.status_code != 200 {
            bail!(
                "cost optimizer returned {}: {}",
                result.status_code,
                result.body
            );
        }

        let payload: CostAnalysisPayload = serde_json::from_value(result.body)?;

        let mut utilization = Vec::with_capacity(self.config.services.len());
        for service in &self.config.services {
            let cpu = self
                .source
                .cpu_utilization(service)
                .await
                .unwrap_or_default();
            let memory = self
                .source
                .memory_utilization(service)
                .await
                .unwrap_or_default();

            let verdict = if cpu.average < DOWNSIZE_CPU_THRESHOLD {
                "Consider downsizing"
            } else if cpu.average > SCALE_UP_CPU_THRESHOLD {
                "Consider scaling up"
            } else {
                "Optimal"
            };

            utilization.push(UtilizationVerdict {
                service: service.clone(),
                cpu_avg: cpu.average,
                memory_avg: memory.average,
                verdict: verdict.to_string(),
            });
        }

        Ok(CostReport {
            timestamp: payload.timestamp,
            estimated_monthly_savings: payload.estimated_savings,
            recommendations: payload.recommendations,
            utilization,
        })
    }

    /// Read the autoscaling targets for every configured service, degrading
    /// per service on failure.
    pub async fn scaling_targets(&self) -> Result<Vec<ServiceScalingTarget>> {
        let cluster = self.config.cluster_name();
        let mut out = Vec::with_capacity(self.config.services.len());

        for service in &self.config.services {
            let target = match self.source.scaling_target(service).await {
                Ok(target) => target,
                Err(e) => {
                    warn!(service = %service, error = %e, "Failed to read scaling target");
                    None
                }
            };

            let running_tasks = match self.source.describe_service(&cluster, service).await {
                Ok(Some(description)) => description.running_count,
                _ => 0,
            };

            out.push(ServiceScalingTarget {
                service: service.clone(),
                min_capacity: target.as_ref().map(|t| t.min_capacity),
                max_capacity: target.as_ref().map(|t| t.max_capacity),
                running_tasks,
            });
        }

        Ok(out)
    }

    /// Update the autoscaling min/max for one service. `min < max` is
    /// checked before any call is made.
    pub async fn update_scaling_target(&self, service: &str, min: u32, max: u32) -> Result<()> {
        if !self.config.services.iter().any(|s| s == service) {
            return Err(ActionError::UnknownService(service.to_string()).into());
        }
        if min >= max {
            return Err(ActionError::InvalidCapacity { min, max }.into());
        }

        self.source.set_scaling_target(service, min, max).await?;
        info!(service, min, max, "Scaling target updated");
        Ok(())
    }
}
