//! Remote job runner abstraction
//!
//! [`JobRunner`] is the only thing [`ProcessRunner`](crate::ProcessRunner)
//! needs from the server: submit a process, refresh a handle, and read an
//! output blob. [`ResolweClient`] implements it over HTTP; tests substitute
//! scripted in-memory runners.

use async_trait::async_trait;
use resolwe_core::domain::data::{Data, ProcessInputs};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::ResolweClient;
use crate::error::{ClientError, Result};

/// Service trait for a remote process runner
#[async_trait]
pub trait JobRunner: Send + Sync {
    /// Returns an existing data object matching `(slug, inputs)` or starts a new one
    async fn get_or_run(&self, slug: &str, inputs: &ProcessInputs) -> Result<Data>;

    /// Updates status and outputs of `data` in place from the server
    async fn refresh(&self, data: &mut Data) -> Result<()>;

    /// Retrieves the JSON artifact referenced by an output field
    async fn fetch_blob(&self, data: &Data, output_field: &str) -> Result<JsonValue>;
}

#[async_trait]
impl JobRunner for ResolweClient {
    async fn get_or_run(&self, slug: &str, inputs: &ProcessInputs) -> Result<Data> {
        self.get_or_create_data(slug, inputs).await
    }

    async fn refresh(&self, data: &mut Data) -> Result<()> {
        let fresh = self.get_data(data.id).await?;
        debug!("Refreshed data {}: {}", data.id, fresh.status);

        data.status = fresh.status;
        data.output = fresh.output;
        data.started = fresh.started;
        data.finished = fresh.finished;
        data.process_error = fresh.process_error;
        data.descriptor = fresh.descriptor;
        data.descriptor_schema = fresh.descriptor_schema;
        if !fresh.name.is_empty() {
            data.name = fresh.name;
        }
        Ok(())
    }

    async fn fetch_blob(&self, data: &Data, output_field: &str) -> Result<JsonValue> {
        let storage_id = data.storage_id(output_field).ok_or_else(|| {
            ClientError::NotFound(format!(
                "data {} has no storage in output '{}'",
                data.id, output_field
            ))
        })?;

        Ok(self.get_storage(storage_id).await?.json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientConfig;
    use resolwe_core::domain::data::DataStatus;
    use serde_json::json;
    use std::collections::HashMap;

    async fn anonymous_client(server: &mockito::Server) -> ResolweClient {
        ResolweClient::connect(ClientConfig::new(server.url(), "", ""))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_refresh_updates_status_and_outputs() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/api/data/31")
            .with_status(200)
            .with_body(
                r#"{"id": 31, "status": "OK", "output": {"counts_json": 19},
                    "descriptor_schema": {"slug": "data_info"},
                    "descriptor": {"tabular": {"cells": 1000}}}"#,
            )
            .create_async()
            .await;

        let client = anonymous_client(&server).await;
        let mut data: Data = serde_json::from_value(json!({
            "id": 31,
            "process_slug": "counts",
            "status": "PR",
            "input": {"axis": 1}
        }))
        .unwrap();

        client.refresh(&mut data).await.unwrap();

        assert_eq!(data.status, DataStatus::Ok);
        assert_eq!(data.storage_id("counts_json"), Some(19));
        assert_eq!(data.descriptor["tabular"]["cells"], 1000);
        assert_eq!(data.descriptor_schema, Some(json!({"slug": "data_info"})));
        // Local fields not re-sent by the server survive a refresh
        assert_eq!(data.process_slug, "counts");
        assert_eq!(data.input, HashMap::from([("axis".to_string(), json!(1))]));
    }

    #[tokio::test]
    async fn test_fetch_blob() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/api/storage/19")
            .with_status(200)
            .with_body(r#"{"id": 19, "json": {"counts": [10, 20]}}"#)
            .create_async()
            .await;

        let client = anonymous_client(&server).await;
        let data: Data = serde_json::from_value(json!({
            "id": 31,
            "status": "OK",
            "output": {"counts_json": 19}
        }))
        .unwrap();

        let blob = client.fetch_blob(&data, "counts_json").await.unwrap();

        assert_eq!(blob, json!({"counts": [10, 20]}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_blob_missing_output() {
        let server = mockito::Server::new_async().await;
        let client = anonymous_client(&server).await;
        let data: Data = serde_json::from_value(json!({"id": 31, "status": "OK"})).unwrap();

        let err = client.fetch_blob(&data, "counts_json").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
