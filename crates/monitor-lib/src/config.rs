//! Monitor configuration

use anyhow::Result;
use serde::Deserialize;

/// Monitoring configuration, loaded from `FLEETWATCH_*` environment
/// variables with per-field defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Project name; prefixes every platform resource identifier.
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// Deployment environment (dev/staging/prod).
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Platform region.
    #[serde(default = "default_region")]
    pub region: String,

    /// Platform gateway endpoint.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Services to monitor, in report order.
    #[serde(default = "default_services")]
    pub services: Vec<String>,

    /// Lookback window for CPU/memory utilization sampling.
    #[serde(default = "default_utilization_lookback")]
    pub utilization_lookback_secs: u64,

    /// Lookback window for log error counting.
    #[serde(default = "default_error_lookback")]
    pub error_lookback_secs: u64,

    /// Metric sampling period.
    #[serde(default = "default_metric_period")]
    pub metric_period_secs: u64,
}

fn default_project_name() -> String {
    "microservices".to_string()
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_gateway_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_services() -> Vec<String> {
    [
        "api-gateway",
        "user-service",
        "product-service",
        "order-service",
        "notification-service",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_utilization_lookback() -> u64 {
    600
}

fn default_error_lookback() -> u64 {
    3600
}

fn default_metric_period() -> u64 {
    300
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            environment: default_environment(),
            region: default_region(),
            gateway_url: default_gateway_url(),
            services: default_services(),
            utilization_lookback_secs: default_utilization_lookback(),
            error_lookback_secs: default_error_lookback(),
            metric_period_secs: default_metric_period(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("FLEETWATCH"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }

    /// Cluster identifier for this project.
    pub fn cluster_name(&self) -> String {
        format!("{}-cluster", self.project_name)
    }

    /// Platform-qualified service identifier.
    pub fn qualified_service(&self, service: &str) -> String {
        format!("{}-{}", self.project_name, service)
    }

    /// Database instance identifier.
    pub fn database_id(&self) -> String {
        format!("{}-db", self.project_name)
    }

    /// Cache cluster identifier.
    pub fn cache_id(&self) -> String {
        format!("{}-cache", self.project_name)
    }

    /// Log group for one service.
    pub fn log_group(&self, service: &str) -> String {
        format!("/services/{}", self.qualified_service(service))
    }

    /// Autoscaling resource identifier for one service.
    pub fn scaling_resource(&self, service: &str) -> String {
        format!(
            "service/{}/{}",
            self.cluster_name(),
            self.qualified_service(service)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_project_prefixed() {
        let config = MonitorConfig::default();

        assert_eq!(config.cluster_name(), "microservices-cluster");
        assert_eq!(
            config.qualified_service("user-service"),
            "microservices-user-service"
        );
        assert_eq!(config.database_id(), "microservices-db");
        assert_eq!(config.cache_id(), "microservices-cache");
        assert_eq!(
            config.log_group("user-service"),
            "/services/microservices-user-service"
        );
        assert_eq!(
            config.scaling_resource("user-service"),
            "service/microservices-cluster/microservices-user-service"
        );
    }

    #[test]
    fn default_service_list_is_ordered() {
        let config = MonitorConfig::default();
        assert_eq!(config.services.len(), 5);
        assert_eq!(config.services[0], "api-gateway");
        assert_eq!(config.services[4], "notification-service");
    }
}
