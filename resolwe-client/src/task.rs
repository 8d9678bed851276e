//! Cancellable background tasks
//!
//! A [`TaskSlot`] holds at most one running operation. Work is spawned onto
//! the tokio runtime (or its blocking pool) and its outcome is handed back to
//! whoever owns the slot through [`TaskSlot::completed`].
//!
//! Guarantees:
//! - submitting into an occupied slot first cancels and joins the old task
//! - [`TaskSlot::cancel`] returns only after the worker has finished
//! - an outcome is delivered at most once, and never for a cancelled task
//!
//! Cancellation is cooperative. The worker receives a [`CancellationToken`]
//! and is expected to check it at its own suspension points; a worker that
//! ignores it still runs to the end, but its result is discarded.

use std::future::Future;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ClientError, Result};

/// Outcome of a finished task
#[derive(Debug)]
pub struct TaskCompletion<T> {
    pub task_id: Uuid,
    /// Logical operation tag given at submission (e.g. "download")
    pub identifier: String,
    /// Value returned by the worker, or the error it failed with
    pub result: Result<T>,
}

/// A running unit of work owned by a [`TaskSlot`]
pub struct Task<T> {
    id: Uuid,
    identifier: String,
    cancel: CancellationToken,
    handle: JoinHandle<Option<Result<T>>>,
}

impl<T> Task<T> {
    /// Unique id assigned at submission
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Logical operation tag given at submission
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Whether cancellation has been requested for this task
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Slot running at most one task at a time
pub struct TaskSlot<T> {
    current: Option<Task<T>>,
}

impl<T: Send + 'static> TaskSlot<T> {
    /// Creates an empty slot
    pub fn new() -> Self {
        Self { current: None }
    }

    /// The live task, if any
    pub fn current(&self) -> Option<&Task<T>> {
        self.current.as_ref()
    }

    /// Whether the slot holds a task whose outcome has not been taken yet
    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    /// Starts `work` in this slot, retiring any task already in it
    ///
    /// `work` is called on the worker with the task's cancellation token.
    /// If the task is cancelled before the worker starts, `work` is never
    /// called.
    ///
    /// # Returns
    /// The id of the new task
    pub async fn submit<F, Fut>(&mut self, identifier: impl Into<String>, work: F) -> Uuid
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.cancel().await;

        let identifier = identifier.into();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let name = identifier.clone();

        let handle = tokio::spawn(async move {
            if token.is_cancelled() {
                debug!("Task '{}' cancelled before it started", name);
                return None;
            }

            let result = work(token.clone()).await;

            if token.is_cancelled() {
                debug!("Discarding result of cancelled task '{}'", name);
                return None;
            }
            Some(result)
        });

        self.install(identifier, cancel, handle)
    }

    /// Starts a blocking closure on the blocking thread pool
    ///
    /// Same slot semantics as [`submit`](Self::submit).
    pub async fn submit_blocking<F>(&mut self, identifier: impl Into<String>, work: F) -> Uuid
    where
        F: FnOnce(CancellationToken) -> Result<T> + Send + 'static,
    {
        self.cancel().await;

        let identifier = identifier.into();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let name = identifier.clone();

        let handle = tokio::task::spawn_blocking(move || {
            if token.is_cancelled() {
                debug!("Task '{}' cancelled before it started", name);
                return None;
            }

            let result = work(token.clone());

            if token.is_cancelled() {
                debug!("Discarding result of cancelled task '{}'", name);
                return None;
            }
            Some(result)
        });

        self.install(identifier, cancel, handle)
    }

    fn install(
        &mut self,
        identifier: String,
        cancel: CancellationToken,
        handle: JoinHandle<Option<Result<T>>>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        debug!("Started task '{}' ({})", identifier, id);

        self.current = Some(Task {
            id,
            identifier,
            cancel,
            handle,
        });
        id
    }

    /// Cancels the live task and waits for its worker to finish
    ///
    /// The slot is empty afterwards and the task's outcome is dropped.
    ///
    /// # Returns
    /// `true` if a task was cancelled
    pub async fn cancel(&mut self) -> bool {
        let Some(task) = self.current.take() else {
            return false;
        };

        task.cancel.cancel();
        if let Err(e) = task.handle.await {
            if e.is_panic() {
                warn!("Task '{}' panicked while being cancelled", task.identifier);
            }
        }

        info!("Cancelled task '{}' ({})", task.identifier, task.id);
        true
    }

    /// Waits for the live task to finish and takes its outcome
    ///
    /// Returns `None` when the slot is empty. Dropping the returned future
    /// before it resolves leaves the task in the slot.
    pub async fn completed(&mut self) -> Option<TaskCompletion<T>> {
        let task = self.current.as_mut()?;
        let joined = (&mut task.handle).await;
        let task = self.current.take()?;

        let result = match joined {
            Ok(Some(result)) => result,
            Ok(None) => {
                debug!("Task '{}' ended without a result", task.identifier);
                return None;
            }
            Err(e) if e.is_panic() => Err(ClientError::TaskFailed(format!(
                "task '{}' panicked",
                task.identifier
            ))),
            Err(e) => Err(ClientError::TaskFailed(e.to_string())),
        };

        debug!("Task '{}' ({}) completed", task.identifier, task.id);
        Some(TaskCompletion {
            task_id: task.id,
            identifier: task.identifier,
            result,
        })
    }
}

impl<T: Send + 'static> Default for TaskSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for TaskSlot<T> {
    fn drop(&mut self) {
        if let Some(task) = &self.current {
            task.cancel.cancel();
        }
    }
}
