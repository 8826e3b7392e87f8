//! CLI command implementations

pub mod costs;
pub mod dashboard;
pub mod health;
pub mod loadtest;
pub mod report;
pub mod scaling;
