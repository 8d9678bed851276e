//! Process runner
//!
//! Submits a process through a [`JobRunner`] and waits for the resulting
//! data object to reach a terminal status.
//!
//! Waiting is a fixed-interval poll bounded by an overall timeout. When the
//! timeout elapses the client gives up locally; the process is not cancelled
//! on the server and may still finish there.

use resolwe_core::domain::data::{Data, ProcessInputs};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::runner::JobRunner;

/// Runs processes and polls them to completion
pub struct ProcessRunner<R: ?Sized> {
    runner: Arc<R>,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl<R: ?Sized> Clone for ProcessRunner<R> {
    fn clone(&self) -> Self {
        Self {
            runner: Arc::clone(&self.runner),
            poll_interval: self.poll_interval,
            poll_timeout: self.poll_timeout,
        }
    }
}

impl<R: JobRunner + ?Sized> ProcessRunner<R> {
    /// Creates a runner using the polling settings of `config`
    pub fn new(runner: Arc<R>, config: &ClientConfig) -> Self {
        Self {
            runner,
            poll_interval: config.poll_interval,
            poll_timeout: config.poll_timeout,
        }
    }

    /// The underlying job runner
    pub fn runner(&self) -> &Arc<R> {
        &self.runner
    }

    /// Runs a process and waits until it is terminal
    ///
    /// Returns immediately, without polling, if the server hands back an
    /// object that is already `Ok` or `Error`. A terminal `Error` is a
    /// normal return value; inspect [`Data::status`].
    ///
    /// # Errors
    /// * communication errors from submission or any refresh
    /// * [`ClientError::PollTimeout`] if the object is not terminal in time
    pub async fn run_process(&self, slug: &str, inputs: ProcessInputs) -> Result<Data> {
        self.run_process_cancellable(slug, inputs, &CancellationToken::new())
            .await
    }

    /// Like [`run_process`](Self::run_process), failing on a terminal `Error`
    pub async fn run_process_checked(&self, slug: &str, inputs: ProcessInputs) -> Result<Data> {
        let data = self.run_process(slug, inputs).await?;

        if data.is_error() {
            return Err(ClientError::ProcessFailed {
                slug: slug.to_string(),
                id: data.id,
                message: data
                    .error_message()
                    .unwrap_or_else(|| "no error message".to_string()),
            });
        }

        Ok(data)
    }

    /// Runs a process, observing `cancel` before submission and at every poll tick
    ///
    /// Cancellation only stops local waiting; an in-flight request is allowed
    /// to finish and nothing is cancelled on the server.
    pub async fn run_process_cancellable(
        &self,
        slug: &str,
        inputs: ProcessInputs,
        cancel: &CancellationToken,
    ) -> Result<Data> {
        if cancel.is_cancelled() {
            debug!("Process '{}' cancelled before submission", slug);
            return Err(ClientError::Cancelled);
        }

        let data = self.runner.get_or_run(slug, &inputs).await?;

        if data.is_terminal() {
            info!(
                "Process '{}' already finished (data {}, status {})",
                slug, data.id, data.status
            );
            return Ok(data);
        }

        let id = data.id;
        match time::timeout(self.poll_timeout, self.wait_until_terminal(data, cancel)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Gave up waiting for process '{}' (data {}) after {:?}",
                    slug, id, self.poll_timeout
                );
                Err(ClientError::PollTimeout {
                    slug: slug.to_string(),
                    timeout: self.poll_timeout,
                })
            }
        }
    }

    /// Polls until `data` is terminal
    async fn wait_until_terminal(&self, mut data: Data, cancel: &CancellationToken) -> Result<Data> {
        let mut ticks: u32 = 0;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Stopped polling data {} after {} tick(s): cancelled", data.id, ticks);
                    return Err(ClientError::Cancelled);
                }
                _ = time::sleep(self.poll_interval) => {}
            }

            self.runner.refresh(&mut data).await?;
            ticks += 1;
            debug!("Poll tick {} for data {}: {}", ticks, data.id, data.status);

            if data.is_terminal() {
                info!(
                    "Data {} finished with status {} after {} poll(s)",
                    data.id, data.status, ticks
                );
                return Ok(data);
            }
        }
    }

    /// Reads a JSON output of a finished data object
    ///
    /// # Arguments
    /// * `data` - Terminal data object
    /// * `output_field` - Output field referencing a storage blob
    /// * `json_field` - Optional top-level key to extract from the blob
    pub async fn get_json(
        &self,
        data: &Data,
        output_field: &str,
        json_field: Option<&str>,
    ) -> Result<JsonValue> {
        let blob = self.runner.fetch_blob(data, output_field).await?;

        match json_field {
            None => Ok(blob),
            Some(key) => blob.get(key).cloned().ok_or_else(|| {
                ClientError::NotFound(format!(
                    "key '{}' in output '{}' of data {}",
                    key, output_field, data.id
                ))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRunner;
    use resolwe_core::domain::data::DataStatus;
    use serde_json::json;
    use std::collections::HashMap;

    fn runner_for(scripted: ScriptedRunner) -> (Arc<ScriptedRunner>, ProcessRunner<ScriptedRunner>) {
        let scripted = Arc::new(scripted);
        let runner = ProcessRunner::new(Arc::clone(&scripted), &ClientConfig::default());
        (scripted, runner)
    }

    fn counts_inputs() -> ProcessInputs {
        HashMap::from([
            ("data_table".to_string(), json!(12)),
            ("axis".to_string(), json!(1)),
            ("measure".to_string(), json!(0)),
        ])
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_finished_skips_polling() {
        let (scripted, runner) = runner_for(
            ScriptedRunner::new(DataStatus::Ok, vec![]).with_output("counts_json", json!(19)),
        );

        let data = runner.run_process("counts", counts_inputs()).await.unwrap();

        assert!(data.is_ok());
        assert_eq!(data.storage_id("counts_json"), Some(19));
        assert_eq!(scripted.submissions(), 1);
        assert_eq!(scripted.refreshes(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_failed_is_returned_not_raised() {
        let (scripted, runner) = runner_for(ScriptedRunner::new(DataStatus::Error, vec![]));

        let data = runner.run_process("counts", counts_inputs()).await.unwrap();

        assert!(data.is_error());
        assert_eq!(scripted.refreshes(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_finishes_after_three_polls() {
        let (scripted, runner) = runner_for(
            ScriptedRunner::new(
                DataStatus::Running,
                vec![DataStatus::Running, DataStatus::Running, DataStatus::Ok],
            )
            .with_output("counts_json", json!(19)),
        );

        let start = time::Instant::now();
        let data = runner.run_process("counts", counts_inputs()).await.unwrap();

        assert_eq!(data.status, DataStatus::Ok);
        assert_eq!(
            data.output,
            HashMap::from([("counts_json".to_string(), json!(19))])
        );
        assert_eq!(data.input, counts_inputs());
        assert_eq!(scripted.refreshes(), 3);
        assert!(start.elapsed() >= Duration::from_millis(1500));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_then_error() {
        let (scripted, runner) = runner_for(ScriptedRunner::new(
            DataStatus::Pending,
            vec![DataStatus::Running, DataStatus::Error],
        ));

        let data = runner.run_process("tsne", HashMap::new()).await.unwrap();

        assert!(data.is_error());
        assert_eq!(scripted.refreshes(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_stops_polling() {
        let (scripted, runner) = runner_for(ScriptedRunner::stuck());

        let start = time::Instant::now();
        let err = runner
            .run_process("counts", counts_inputs())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClientError::PollTimeout { ref slug, timeout }
                if slug == "counts" && timeout == Duration::from_secs(60)
        ));
        assert!(start.elapsed() >= Duration::from_secs(60));

        let polls = scripted.refreshes();
        assert!((119..=120).contains(&polls), "polled {} times", polls);

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(scripted.refreshes(), polls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_failure_is_surfaced() {
        let (scripted, runner) = runner_for(ScriptedRunner::stuck().failing_refresh_at(2));

        let err = runner
            .run_process("counts", counts_inputs())
            .await
            .unwrap_err();

        assert!(err.is_communication_error());
        assert_eq!(scripted.refreshes(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_submission() {
        let (scripted, runner) = runner_for(ScriptedRunner::stuck());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = runner
            .run_process_cancellable("counts", counts_inputs(), &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(scripted.submissions(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_polling() {
        let (scripted, runner) = runner_for(ScriptedRunner::stuck());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(2250)).await;
            trigger.cancel();
        });

        let err = runner
            .run_process_cancellable("counts", counts_inputs(), &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(scripted.refreshes(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_process_checked() {
        let (_, runner) = runner_for(ScriptedRunner::new(DataStatus::Error, vec![]));

        let err = runner
            .run_process_checked("counts", counts_inputs())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::ProcessFailed { id: 1, .. }));
    }

    #[tokio::test]
    async fn test_get_json() {
        let (_, runner) = runner_for(
            ScriptedRunner::new(DataStatus::Ok, vec![])
                .with_output("counts_json", json!(19))
                .with_blob(19, json!({"counts": [5, 8, 13]})),
        );
        let data = runner.run_process("counts", counts_inputs()).await.unwrap();

        let counts = runner
            .get_json(&data, "counts_json", Some("counts"))
            .await
            .unwrap();
        assert_eq!(counts, json!([5, 8, 13]));

        let blob = runner.get_json(&data, "counts_json", None).await.unwrap();
        assert_eq!(blob, json!({"counts": [5, 8, 13]}));

        let err = runner
            .get_json(&data, "counts_json", Some("missing"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
