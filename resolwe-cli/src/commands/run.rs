//! Run command handler
//!
//! Submits a process and waits for it in a background task. Ctrl-C cancels
//! the local wait; the process itself keeps running on the server.

use anyhow::{Result, bail};
use colored::*;
use resolwe_client::{ProcessRunner, TaskSlot};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::display::print_data_details;
use crate::types::{InputArg, into_inputs};

/// Run a process and print the resulting data object
pub async fn handle_run_command(config: &Config, slug: &str, inputs: Vec<InputArg>) -> Result<()> {
    let client = Arc::new(config.connect().await?);
    let runner = ProcessRunner::new(client, &config.client_config());
    let inputs = into_inputs(inputs);

    let mut slot = TaskSlot::new();
    let process = slug.to_string();
    let task_id = slot
        .submit(slug, move |cancel| async move {
            runner
                .run_process_cancellable(&process, inputs, &cancel)
                .await
        })
        .await;
    info!("Started task {} for process '{}'", task_id, slug);

    println!("{} {}", "Waiting for process".dimmed(), slug.cyan());

    let completion = tokio::select! {
        done = slot.completed() => done,
        _ = tokio::signal::ctrl_c() => None,
    };

    let Some(completion) = completion else {
        slot.cancel().await;
        println!(
            "{}",
            "Cancelled. The process may still be running on the server.".yellow()
        );
        return Ok(());
    };

    let data = completion.result?;
    print_data_details(&data);

    if data.is_error() {
        bail!("process '{}' finished with an error", slug);
    }

    Ok(())
}
