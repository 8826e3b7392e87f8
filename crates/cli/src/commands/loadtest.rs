//! Load test command

use anyhow::Result;
use monitor_lib::{ActionDispatcher, LoadTestRequest};
use tokio::sync::broadcast;

use crate::output::{print_info, print_success};

/// Start a load test and stream progress samples until it finishes.
pub async fn start(
    dispatcher: &ActionDispatcher,
    rps: u32,
    duration: u32,
    shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let request = LoadTestRequest {
        target_rps: rps,
        duration_mins: duration,
    };

    dispatcher.start_load_test(&request).await?;
    print_success(&format!(
        "Load test started: {rps} RPS for {duration} minutes"
    ));
    print_info("Monitoring request rate. Press Ctrl-C to stop watching (the test keeps running).");

    dispatcher
        .monitor_load_test(duration, shutdown, |progress| {
            println!(
                "[{:>4}s/{:>4}s] {:>5.1}% complete - current rate: {:.1} req/s",
                progress.elapsed_secs,
                progress.elapsed_secs + progress.remaining_secs,
                progress.percent_complete,
                progress.current_rps
            );
        })
        .await?;

    print_success("Load test monitoring finished");
    Ok(())
}
