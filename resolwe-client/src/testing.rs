//! Scripted in-memory runner for tests

use async_trait::async_trait;
use resolwe_core::domain::data::{Data, DataStatus, ProcessInputs};
use serde_json::Value as JsonValue;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{ClientError, Result};
use crate::runner::JobRunner;

/// Runner whose refreshes walk through a fixed list of statuses
///
/// Once the script is exhausted the last status repeats. Outputs are
/// attached when a refresh reports `Ok`.
pub struct ScriptedRunner {
    initial: DataStatus,
    script: Mutex<VecDeque<DataStatus>>,
    outputs: HashMap<String, JsonValue>,
    blobs: HashMap<u64, JsonValue>,
    fail_refresh_at: Option<usize>,
    submissions: AtomicUsize,
    refreshes: AtomicUsize,
}

impl ScriptedRunner {
    pub fn new(initial: DataStatus, script: Vec<DataStatus>) -> Self {
        Self {
            initial,
            script: Mutex::new(script.into()),
            outputs: HashMap::new(),
            blobs: HashMap::new(),
            fail_refresh_at: None,
            submissions: AtomicUsize::new(0),
            refreshes: AtomicUsize::new(0),
        }
    }

    /// Never leaves `Running`
    pub fn stuck() -> Self {
        Self::new(DataStatus::Running, vec![DataStatus::Running])
    }

    pub fn with_output(mut self, field: &str, value: JsonValue) -> Self {
        self.outputs.insert(field.to_string(), value);
        self
    }

    pub fn with_blob(mut self, storage_id: u64, json: JsonValue) -> Self {
        self.blobs.insert(storage_id, json);
        self
    }

    /// Makes the n-th refresh (1-based) fail with a server error
    pub fn failing_refresh_at(mut self, n: usize) -> Self {
        self.fail_refresh_at = Some(n);
        self
    }

    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobRunner for ScriptedRunner {
    async fn get_or_run(&self, slug: &str, inputs: &ProcessInputs) -> Result<Data> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        let output = if self.initial == DataStatus::Ok {
            self.outputs.clone()
        } else {
            HashMap::new()
        };

        Ok(Data {
            id: 1,
            slug: format!("{}-1", slug),
            name: slug.to_string(),
            process_slug: slug.to_string(),
            status: self.initial,
            input: inputs.clone(),
            output,
            descriptor: JsonValue::Null,
            descriptor_schema: None,
            started: None,
            finished: None,
            process_error: Vec::new(),
            current_user_permissions: Vec::new(),
        })
    }

    async fn refresh(&self, data: &mut Data) -> Result<()> {
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_refresh_at == Some(n) {
            return Err(ClientError::api_error(503, "service unavailable"));
        }

        let status = {
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().copied()
            }
        };

        if let Some(status) = status {
            data.status = status;
            if status == DataStatus::Ok {
                data.output = self.outputs.clone();
            }
        }
        Ok(())
    }

    async fn fetch_blob(&self, data: &Data, output_field: &str) -> Result<JsonValue> {
        data.storage_id(output_field)
            .and_then(|id| self.blobs.get(&id).cloned())
            .ok_or_else(|| ClientError::NotFound(output_field.to_string()))
    }
}
