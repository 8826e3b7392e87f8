//! FleetWatch CLI
//!
//! An operator console that polls the container platform and its managed
//! services, aggregates health into monitoring reports, and drives
//! load-test and cost-analysis workflows.

mod commands;
mod output;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use monitor_lib::client::GatewayClient;
use monitor_lib::{
    ActionDispatcher, GatewayMetricSource, HealthCollector, MonitorConfig, ScoringPolicy,
};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

/// FleetWatch operator console
#[derive(Parser)]
#[command(name = "fleetwatch")]
#[command(author, version, about = "Operator console for container fleet health", long_about = None)]
pub struct Cli {
    /// Platform gateway URL (can also be set via FLEETWATCH_GATEWAY_URL)
    #[arg(long, env = "FLEETWATCH_GATEWAY_URL")]
    pub gateway_url: Option<String>,

    /// Project name
    #[arg(long, short)]
    pub project: Option<String>,

    /// Environment (dev/staging/prod)
    #[arg(long, short)]
    pub environment: Option<String>,

    /// Platform region
    #[arg(long, short)]
    pub region: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a monitoring report
    Report {
        /// Save the report as a timestamped JSON file
        #[arg(long)]
        save: bool,

        /// Watch mode - regenerate the report continuously
        #[arg(long)]
        watch: bool,

        /// Poll interval in seconds for watch mode
        #[arg(long, default_value_t = 60)]
        interval: u64,
    },

    /// Live-refreshing service dashboard
    Dashboard {
        /// Refresh interval in seconds
        #[arg(long, default_value_t = 10)]
        interval: u64,
    },

    /// Per-service health check with issues and remediation hints
    Health,

    /// Autoscaling target management
    #[command(subcommand)]
    Scaling(ScalingCommands),

    /// Load testing
    #[command(subcommand)]
    Loadtest(LoadtestCommands),

    /// Cost analysis
    #[command(subcommand)]
    Costs(CostsCommands),
}

#[derive(Subcommand)]
pub enum ScalingCommands {
    /// Show current scaling targets for all services
    Show,

    /// Update the scaling target for one service
    Update {
        /// Service name
        service: String,

        /// Minimum capacity
        #[arg(long)]
        min: u32,

        /// Maximum capacity
        #[arg(long)]
        max: u32,
    },
}

#[derive(Subcommand)]
pub enum LoadtestCommands {
    /// Start a load test and monitor its progress
    Start {
        /// Target requests per second (10-1000)
        #[arg(long, default_value_t = 100)]
        rps: u32,

        /// Duration in minutes (1-60)
        #[arg(long, default_value_t = 10)]
        duration: u32,
    },
}

#[derive(Subcommand)]
pub enum CostsCommands {
    /// Run the cost optimizer and show its recommendations
    Analyze,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    // Environment-driven configuration with CLI overrides.
    let mut config = MonitorConfig::load()?;
    if let Some(url) = cli.gateway_url {
        config.gateway_url = url;
    }
    if let Some(project) = cli.project {
        config.project_name = project;
    }
    if let Some(environment) = cli.environment {
        config.environment = environment;
    }
    if let Some(region) = cli.region {
        config.region = region;
    }

    let client = GatewayClient::new(&config.gateway_url)?;
    let source = Arc::new(GatewayMetricSource::new(client, config.clone()));
    let collector = HealthCollector::new(source.clone(), ScoringPolicy::default(), config.clone());
    let dispatcher = ActionDispatcher::new(source, config);

    // Ctrl-C cancels watch/dashboard/loadtest loops within one interval.
    let (shutdown_tx, _) = broadcast::channel(1);
    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = signal_tx.send(());
        }
    });

    match cli.command {
        Commands::Report {
            save,
            watch,
            interval,
        } => {
            commands::report::run(
                &collector,
                cli.format,
                save,
                watch,
                interval,
                shutdown_tx.subscribe(),
            )
            .await?;
        }
        Commands::Dashboard { interval } => {
            commands::dashboard::run(&collector, interval, shutdown_tx.subscribe()).await?;
        }
        Commands::Health => {
            commands::health::run(&collector, cli.format).await?;
        }
        Commands::Scaling(scaling_cmd) => match scaling_cmd {
            ScalingCommands::Show => {
                commands::scaling::show(&dispatcher, cli.format).await?;
            }
            ScalingCommands::Update { service, min, max } => {
                commands::scaling::update(&dispatcher, &service, min, max).await?;
            }
        },
        Commands::Loadtest(loadtest_cmd) => match loadtest_cmd {
            LoadtestCommands::Start { rps, duration } => {
                commands::loadtest::start(&dispatcher, rps, duration, shutdown_tx.subscribe())
                    .await?;
            }
        },
        Commands::Costs(costs_cmd) => match costs_cmd {
            CostsCommands::Analyze => {
                commands::costs::analyze(&dispatcher, cli.format).await?;
            }
        },
    }

    Ok(())
}
