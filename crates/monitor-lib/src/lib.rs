//! Fleet monitoring library
//!
//! This crate provides the core functionality for:
//! - Polling orchestration, metrics, log, and load-balancer APIs
//! - Health scoring of individual services
//! - Aggregation into fleet-wide monitoring reports
//! - A cancellable refresh loop for watch/dashboard modes
//! - Operator actions (scaling targets, load tests, cost analysis)

pub mod actions;
pub mod aggregate;
pub mod client;
pub mod collector;
pub mod config;
pub mod models;
pub mod refresh;
pub mod scoring;
pub mod source;

pub use actions::{ActionDispatcher, ActionError, LoadTestRequest};
pub use collector::HealthCollector;
pub use config::MonitorConfig;
pub use models::*;
pub use refresh::{RefreshLoop, RefreshMode};
pub use scoring::{RawSignals, ScoredHealth, ScoringPolicy};
pub use source::{GatewayMetricSource, MetricSource};
