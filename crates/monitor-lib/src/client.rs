//! HTTP client for the platform gateway
//!
//! The gateway fronts the cloud provider's orchestration, metrics, log,
//! load-balancer, autoscaling, and function-invocation APIs behind a plain
//! JSON surface. Requests carry a bounded timeout so a hung dependency can
//! never stall a poll cycle indefinitely.

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

/// Request timeout for all gateway calls.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// JSON client for the platform gateway
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: Url,
}

impl GatewayClient {
    /// Create a new gateway client.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid gateway URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gateway error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }

    /// Make a GET request where a 404 means "resource does not exist".
    pub async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gateway error ({}): {}", status, body);
        }

        let value = response.json().await.context("Failed to parse response")?;
        Ok(Some(value))
    }

    /// Make a POST request with a JSON body.
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gateway error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }
}

// Gateway wire types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterDescription {
    pub name: String,
    pub status: String,
    pub running_tasks: u32,
    pub pending_tasks: u32,
    pub active_services: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDescription {
    pub status: String,
    pub running_count: u32,
    pub desired_count: u32,
    /// RFC 3339 timestamp of the most recent deployment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_deployment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricQuery {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Vec<Dimension>,
    pub lookback_secs: u64,
    pub period_secs: u64,
    pub statistics: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricStatistics {
    pub datapoints: Vec<Datapoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Datapoint {
    #[serde(default)]
    pub average: f64,
    #[serde(default)]
    pub maximum: f64,
    #[serde(default)]
    pub sum: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogEventCount {
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceStatus {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadBalancerList {
    pub load_balancers: Vec<LoadBalancerDescription>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadBalancerDescription {
    pub id: String,
    pub name: String,
    pub state: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetHealthList {
    pub targets: Vec<TargetDescription>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetDescription {
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingTarget {
    pub min_capacity: u32,
    pub max_capacity: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScalingTargetUpdate {
    pub resource_id: String,
    pub min_capacity: u32,
    pub max_capacity: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvocationResult {
    pub status_code: u16,
    pub body: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_parses_json_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/clusters/demo-cluster")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"name":"demo-cluster","status":"ACTIVE","running_tasks":7,"pending_tasks":1,"active_services":5}"#,
            )
            .create_async()
            .await;

        let client = GatewayClient::new(&server.url()).unwrap();
        let cluster: ClusterDescription = client.get("/api/v1/clusters/demo-cluster").await.unwrap();

        assert_eq!(cluster.name, "demo-cluster");
        assert_eq!(cluster.running_tasks, 7);
        assert_eq!(cluster.active_services, 5);
    }

    #[tokio::test]
    async fn get_fails_on_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/clusters/demo-cluster")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = GatewayClient::new(&server.url()).unwrap();
        let result: Result<ClusterDescription> = client.get("/api/v1/clusters/demo-cluster").await;

        let err = result.unwrap_err().to_string();
        assert!(err.contains("500"), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn get_optional_maps_404_to_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/clusters/ghost/services/ghost-svc")
            .with_status(404)
            .create_async()
            .await;

        let client = GatewayClient::new(&server.url()).unwrap();
        let service: Option<ServiceDescription> = client
            .get_optional("/api/v1/clusters/ghost/services/ghost-svc")
            .await
            .unwrap();

        assert!(service.is_none());
    }

    #[tokio::test]
    async fn post_sends_json_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/metrics/query")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body(r#"{"datapoints":[{"average":42.5,"maximum":61.0}]}"#)
            .create_async()
            .await;

        let client = GatewayClient::new(&server.url()).unwrap();
        let query = MetricQuery {
            namespace: "fleet/services".to_string(),
            metric_name: "CpuUtilization".to_string(),
            dimensions: vec![Dimension {
                name: "ServiceName".to_string(),
                value: "demo-user-service".to_string(),
            }],
            lookback_secs: 600,
            period_secs: 300,
            statistics: vec!["Average".to_string(), "Maximum".to_string()],
        };

        let stats: MetricStatistics = client.post("/api/v1/metrics/query", &query).await.unwrap();

        assert_eq!(stats.datapoints.len(), 1);
        assert_eq!(stats.datapoints[0].average, 42.5);
        // Sum was absent from the response and defaults to zero.
        assert_eq!(stats.datapoints[0].sum, 0.0);
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(GatewayClient::new("not a url").is_err());
    }
}
