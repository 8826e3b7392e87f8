//! Autoscaling target commands

use anyhow::Result;
use monitor_lib::ActionDispatcher;
use serde_json::json;
use tabled::Tabled;

use crate::output::{print_success, OutputFormat};

#[derive(Tabled)]
struct ScalingRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Min")]
    min: String,
    #[tabled(rename = "Max")]
    max: String,
    #[tabled(rename = "Running")]
    running: String,
}

/// Show the autoscaling targets for every configured service.
pub async fn show(dispatcher: &ActionDispatcher, format: OutputFormat) -> Result<()> {
    let targets = dispatcher.scaling_targets().await?;

    match format {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = targets
                .iter()
                .map(|t| {
                    json!({
                        "service": t.service,
                        "min_capacity": t.min_capacity,
                        "max_capacity": t.max_capacity,
                        "running_tasks": t.running_tasks,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Table => {
            let rows: Vec<ScalingRow> = targets
                .iter()
                .map(|t| ScalingRow {
                    service: t.service.clone(),
                    min: t
                        .min_capacity
                        .map_or_else(|| "-".to_string(), |v| v.to_string()),
                    max: t
                        .max_capacity
                        .map_or_else(|| "-".to_string(), |v| v.to_string()),
                    running: t.running_tasks.to_string(),
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

/// Update the scaling target for one service.
pub async fn update(dispatcher: &ActionDispatcher, service: &str, min: u32, max: u32) -> Result<()> {
    dispatcher.update_scaling_target(service, min, max).await?;
    print_success(&format!(
        "Scaling target updated: {service} (min: {min}, max: {max})"
    ));
    Ok(())
}
