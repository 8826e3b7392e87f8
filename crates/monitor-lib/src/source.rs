//! Metric source abstraction
//!
//! [`MetricSource`] is the narrow seam between the monitoring engine and the
//! external platform APIs. The production implementation talks to the
//! gateway; tests substitute mocks.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::client::{
    ClusterDescription, Dimension, GatewayClient, InvocationResult, LoadBalancerList,
    LogEventCount, MetricQuery, MetricStatistics, ResourceStatus, ScalingTarget,
    ScalingTargetUpdate, ServiceDescription, TargetHealthList,
};
use crate::config::MonitorConfig;

/// Windowed metric aggregate. Zero datapoints fold to zeroes; callers must
/// not distinguish "no traffic" from "no data" at this layer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricSample {
    pub average: f64,
    pub maximum: f64,
}

/// Point-in-time load-balancer view.
#[derive(Debug, Clone)]
pub struct LoadBalancerSnapshot {
    pub status: String,
    pub response_time_secs: f64,
    pub healthy_targets: u32,
    pub unhealthy_targets: u32,
}

impl Default for LoadBalancerSnapshot {
    fn default() -> Self {
        Self {
            status: "unknown".to_string(),
            response_time_secs: 0.0,
            healthy_targets: 0,
            unhealthy_targets: 0,
        }
    }
}

/// Adapter over the external orchestration/metrics/log/load-balancer APIs.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Cluster-level task and service counts.
    async fn describe_cluster(&self, name: &str) -> Result<ClusterDescription>;

    /// Service lifecycle status and task counts; `None` if the platform does
    /// not know the service.
    async fn describe_service(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<Option<ServiceDescription>>;

    /// Windowed CPU utilization for one service.
    async fn cpu_utilization(&self, service: &str) -> Result<MetricSample>;

    /// Windowed memory utilization for one service.
    async fn memory_utilization(&self, service: &str) -> Result<MetricSample>;

    /// ERROR-pattern log events for one service within the error lookback.
    async fn error_count(&self, service: &str) -> Result<u64>;

    async fn database_status(&self) -> Result<String>;

    async fn cache_status(&self) -> Result<String>;

    /// Load-balancer state, response time, and target health counts.
    async fn load_balancer_health(&self) -> Result<LoadBalancerSnapshot>;

    /// Current load-balancer request rate (requests per second).
    async fn request_rate(&self) -> Result<f64>;

    /// Autoscaling min/max for one service, if registered.
    async fn scaling_target(&self, service: &str) -> Result<Option<ScalingTarget>>;

    /// Register (or overwrite) the autoscaling min/max for one service.
    async fn set_scaling_target(&self, service: &str, min: u32, max: u32) -> Result<()>;

    /// Invoke a remote function with a JSON payload.
    async fn invoke_function(
        &self,
        function: &str,
        payload: serde_json::Value,
    ) -> Result<InvocationResult>;
}

/// Metric namespace for service-level metrics.
const SERVICE_NAMESPACE: &str = "fleet/services";
/// Metric namespace for load-balancer metrics.
const LOAD_BALANCER_NAMESPACE: &str = "fleet/loadbalancer";
/// Lookback for the request-rate sample used by load-test monitoring.
const REQUEST_RATE_LOOKBACK_SECS: u64 = 300;

/// Gateway-backed [`MetricSource`].
#[derive(Debug, Clone)]
pub struct GatewayMetricSource {
    client: GatewayClient,
    config: MonitorConfig,
}

impl GatewayMetricSource {
    pub fn new(client: GatewayClient, config: MonitorConfig) -> Self {
        Self { client, config }
    }

    fn service_dimensions(&self, service: &str) -> Vec<Dimension> {
        vec![
            Dimension {
                name: "ServiceName".to_string(),
                value: self.config.qualified_service(service),
            },
            Dimension {
                name: "ClusterName".to_string(),
                value: self.config.cluster_name(),
            },
        ]
    }

    async fn service_metric(&self, service: &str, metric_name: &str) -> Result<MetricSample> {
        let query = MetricQuery {
            namespace: SERVICE_NAMESPACE.to_string(),
            metric_name: metric_name.to_string(),
            dimensions: self.service_dimensions(service),
            lookback_secs: self.config.utilization_lookback_secs,
            period_secs: self.config.metric_period_secs,
            statistics: vec!["Average".to_string(), "Maximum".to_string()],
        };

        let stats: MetricStatistics = self.client.post("api/v1/metrics/query", &query).await?;
        let sample = fold_datapoints(&stats);
        Ok(MetricSample {
            average: round(sample.average, 2),
            maximum: round(sample.maximum, 2),
        })
    }

    async fn target_response_time(&self, load_balancer: &str) -> Result<f64> {
        let query = MetricQuery {
            namespace: LOAD_BALANCER_NAMESPACE.to_string(),
            metric_name: "TargetResponseTime".to_string(),
            dimensions: vec![Dimension {
                name: "LoadBalancer".to_string(),
                value: load_balancer.to_string(),
            }],
            lookback_secs: self.config.utilization_lookback_secs,
            period_secs: self.config.metric_period_secs,
            statistics: vec!["Average".to_string()],
        };

        let stats: MetricStatistics = self.client.post("api/v1/metrics/query", &query).await?;
        Ok(round(fold_datapoints(&stats).average, 3))
    }
}

/// Fold raw datapoints into a single sample: mean of averages, max of
/// maximums. An empty window is defined as zero, not an error. The result
/// is unrounded; callers round to the precision their signal needs.
fn fold_datapoints(stats: &MetricStatistics) -> MetricSample {
    if stats.datapoints.is_empty() {
        return MetricSample::default();
    }

    let average = stats.datapoints.iter().map(|d| d.average).sum::<f64>()
        / stats.datapoints.len() as f64;
    let maximum = stats
        .datapoints
        .iter()
        .map(|d| d.maximum)
        .fold(f64::MIN, f64::max);

    MetricSample { average, maximum }
}

fn round(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[async_trait]
impl MetricSource for GatewayMetricSource {
    async fn describe_cluster(&self, name: &str) -> Result<ClusterDescription> {
        self.client.get(&format!("api/v1/clusters/{name}")).await
    }

    async fn describe_service(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<Option<ServiceDescription>> {
        let qualified = self.config.qualified_service(service);
        self.client
            .get_optional(&format!("api/v1/clusters/{cluster}/services/{qualified}"))
            .await
    }

    async fn cpu_utilization(&self, service: &str) -> Result<MetricSample> {
        self.service_metric(service, "CpuUtilization").await
    }

    async fn memory_utilization(&self, service: &str) -> Result<MetricSample> {
        self.service_metric(service, "MemoryUtilization").await
    }

    async fn error_count(&self, service: &str) -> Result<u64> {
        let path = format!(
            "api/v1/logs/errors?group={}&lookback_secs={}",
            encode(&self.config.log_group(service)),
            self.config.error_lookback_secs
        );
        let result: LogEventCount = self.client.get(&path).await?;
        Ok(result.count)
    }

    async fn database_status(&self) -> Result<String> {
        let status: ResourceStatus = self
            .client
            .get(&format!("api/v1/databases/{}", self.config.database_id()))
            .await?;
        Ok(status.status)
    }

    async fn cache_status(&self) -> Result<String> {
        let status: ResourceStatus = self
            .client
            .get(&format!("api/v1/caches/{}", self.config.cache_id()))
            .await?;
        Ok(status.status)
    }

    async fn load_balancer_health(&self) -> Result<LoadBalancerSnapshot> {
        let list: LoadBalancerList = self.client.get("api/v1/loadbalancers").await?;

        // The project's balancer is the one carrying the project name.
        let Some(balancer) = list
            .load_balancers
            .into_iter()
            .find(|lb| lb.name.contains(&self.config.project_name))
        else {
            debug!("no load balancer matched the project name");
            return Ok(LoadBalancerSnapshot::default());
        };

        let targets: TargetHealthList = self
            .client
            .get(&format!("api/v1/loadbalancers/{}/targets", balancer.id))
            .await?;

        let healthy = targets
            .targets
            .iter()
            .filter(|t| t.state == "healthy")
            .count() as u32;
        let unhealthy = targets.targets.len() as u32 - healthy;

        let response_time_secs = self.target_response_time(&balancer.id).await?;

        Ok(LoadBalancerSnapshot {
            status: balancer.state,
            response_time_secs,
            healthy_targets: healthy,
            unhealthy_targets: unhealthy,
        })
    }

    async fn request_rate(&self) -> Result<f64> {
        let query = MetricQuery {
            namespace: LOAD_BALANCER_NAMESPACE.to_string(),
            metric_name: "RequestCount".to_string(),
            dimensions: vec![Dimension {
                name: "LoadBalancer".to_string(),
                value: format!("{}-alb", self.config.project_name),
            }],
            lookback_secs: REQUEST_RATE_LOOKBACK_SECS,
            period_secs: self.config.metric_period_secs,
            statistics: vec!["Sum".to_string()],
        };

        let stats: MetricStatistics = self.client.post("api/v1/metrics/query", &query).await?;
        let rate = match stats.datapoints.last() {
            Some(point) => point.sum / self.config.metric_period_secs as f64,
            None => 0.0,
        };
        Ok(rate)
    }

    async fn scaling_target(&self, service: &str) -> Result<Option<ScalingTarget>> {
        let path = format!(
            "api/v1/autoscaling/targets?resource={}",
            encode(&self.config.scaling_resource(service))
        );
        self.client.get_optional(&path).await
    }

    async fn set_scaling_target(&self, service: &str, min: u32, max: u32) -> Result<()> {
        let update = ScalingTargetUpdate {
            resource_id: self.config.scaling_resource(service),
            min_capacity: min,
            max_capacity: max,
        };
        let _: ScalingTarget = self
            .client
            .post("api/v1/autoscaling/targets", &update)
            .await?;
        Ok(())
    }

    async fn invoke_function(
        &self,
        function: &str,
        payload: serde_json::Value,
    ) -> Result<InvocationResult> {
        self.client
            .post(&format!("api/v1/functions/{function}/invoke"), &payload)
            .await
    }
}
