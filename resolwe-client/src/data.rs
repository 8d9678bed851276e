//! Data-related API endpoints

use crate::ResolweClient;
use crate::error::{ClientError, Result};
use resolwe_core::domain::data::{Data, ProcessInputs};
use reqwest::multipart::{Form, Part};
use resolwe_core::dto::data::{CreateData, UpdateDescriptor};
use resolwe_core::dto::upload::{UploadResponse, UploadedFile};
use serde_json::{Value as JsonValue, json};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// Process that imports an uploaded table file
pub const DATA_TABLE_UPLOAD: &str = "data-table-upload";

impl ResolweClient {
    // =============================================================================
    // Process Submission
    // =============================================================================

    /// Get a data object matching the process and inputs, or start a new one
    ///
    /// The server deduplicates on `(slug, inputs)`, so the returned object
    /// may already be finished.
    ///
    /// # Example
    /// ```no_run
    /// # use resolwe_client::{ClientConfig, ResolweClient};
    /// # use std::collections::HashMap;
    /// # use serde_json::json;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = ResolweClient::connect(ClientConfig::default()).await?;
    /// let inputs = HashMap::from([("data_table".to_string(), json!(12))]);
    /// let data = client.get_or_create_data("counts", &inputs).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_or_create_data(&self, slug: &str, inputs: &ProcessInputs) -> Result<Data> {
        let url = format!("{}/api/data/get_or_create", self.base_url);
        self.submit(&url, slug, inputs).await
    }

    /// Start a new data object, even if a matching one exists
    pub async fn create_data(&self, slug: &str, inputs: &ProcessInputs) -> Result<Data> {
        let url = format!("{}/api/data", self.base_url);
        self.submit(&url, slug, inputs).await
    }

    async fn submit(&self, url: &str, slug: &str, inputs: &ProcessInputs) -> Result<Data> {
        if slug.is_empty() {
            return Err(ClientError::InvalidRequest(
                "process slug cannot be empty".to_string(),
            ));
        }

        let response = self
            .post(url)
            .json(&CreateData {
                process: slug.to_string(),
                input: inputs.clone(),
            })
            .send()
            .await?;

        let mut data: Data = self.handle_response(response).await?;
        if data.process_slug.is_empty() {
            data.process_slug = slug.to_string();
        }

        info!(
            "Submitted process '{}' as data {} (status: {})",
            slug, data.id, data.status
        );
        Ok(data)
    }

    // =============================================================================
    // Data Query
    // =============================================================================

    /// Get a data object by ID
    pub async fn get_data(&self, id: u64) -> Result<Data> {
        let url = format!("{}/api/data/{}", self.base_url, id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// List data objects, optionally filtered by type
    ///
    /// # Arguments
    /// * `data_type` - Type prefix such as `data:table`
    pub async fn list_data(&self, data_type: Option<&str>) -> Result<Vec<Data>> {
        let url = format!("{}/api/data", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(data_type) = data_type {
            request = request.query(&[("type", data_type)]);
        }
        let response = request.send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Annotation
    // =============================================================================

    /// Replace the descriptor of a data object
    ///
    /// # Arguments
    /// * `id` - Data object ID
    /// * `descriptor_schema` - Slug of the schema the descriptor follows; left
    ///   unchanged when `None`
    /// * `descriptor` - New descriptor, e.g. `{"tabular": {"title": ...}}`
    pub async fn update_descriptor(
        &self,
        id: u64,
        descriptor_schema: Option<&str>,
        descriptor: JsonValue,
    ) -> Result<Data> {
        let url = format!("{}/api/data/{}", self.base_url, id);
        let response = self
            .patch(&url)
            .json(&UpdateDescriptor {
                descriptor_schema: descriptor_schema.map(str::to_string),
                descriptor,
            })
            .send()
            .await?;

        let data: Data = self.handle_response(response).await?;
        debug!("Updated descriptor of data {}", data.id);
        Ok(data)
    }

    // =============================================================================
    // Uploads
    // =============================================================================

    /// Upload a local file into the server's upload area
    ///
    /// # Returns
    /// The uploaded file, whose `temp` name can be referenced from process
    /// inputs
    pub async fn upload_file(&self, path: &Path) -> Result<UploadedFile> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                ClientError::InvalidRequest(format!("bad file name '{}'", path.display()))
            })?
            .to_string();

        let bytes = tokio::fs::read(path).await?;
        let size = bytes.len();
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.clone()));

        let url = format!("{}/upload/", self.base_url);
        debug!("Uploading {} ({} bytes)", path.display(), size);
        let response = self
            .post(&url)
            .header("X-File-Uuid", Uuid::new_v4().to_string())
            .multipart(form)
            .send()
            .await?;

        let uploaded: UploadResponse = self.handle_response(response).await?;
        let mut file = uploaded.files.into_iter().next().ok_or_else(|| {
            ClientError::ParseError("upload response lists no files".to_string())
        })?;
        if file.name.is_empty() {
            file.name = file_name;
        }

        Ok(file)
    }

    /// Upload a table file and run the `data-table-upload` process on it
    ///
    /// When a descriptor is given it is attached to the new data object,
    /// together with `descriptor_schema` if set.
    ///
    /// # Returns
    /// The data object created by the upload process (usually still pending)
    pub async fn upload_data_table(
        &self,
        path: &Path,
        descriptor_schema: Option<&str>,
        descriptor: Option<JsonValue>,
    ) -> Result<Data> {
        let file = self.upload_file(path).await?;

        let inputs = ProcessInputs::from([(
            "src".to_string(),
            json!({"file": file.name, "file_temp": file.temp}),
        )]);
        let data = self.create_data(DATA_TABLE_UPLOAD, &inputs).await?;

        let data = match descriptor {
            Some(descriptor) => {
                let mut updated = self
                    .update_descriptor(data.id, descriptor_schema, descriptor)
                    .await?;
                if updated.process_slug.is_empty() {
                    updated.process_slug = data.process_slug;
                }
                updated
            }
            None => data,
        };

        info!("Uploaded {} as data {}", path.display(), data.id);
        Ok(data)
    }

    // =============================================================================
    // Downloads
    // =============================================================================

    /// Download the file stored in a file-typed output field
    ///
    /// # Arguments
    /// * `data` - The finished data object
    /// * `output_field` - Output field holding `{"file": ...}`
    /// * `dir` - Directory to write the file into
    ///
    /// # Returns
    /// Path of the written file
    pub async fn download_output(
        &self,
        data: &Data,
        output_field: &str,
        dir: &Path,
    ) -> Result<PathBuf> {
        let file_name = data.output_file(output_field).ok_or_else(|| {
            ClientError::NotFound(format!(
                "data {} has no file in output '{}'",
                data.id, output_field
            ))
        })?;

        // Only the last path component is used locally
        let local_name = Path::new(file_name)
            .file_name()
            .ok_or_else(|| ClientError::InvalidRequest(format!("bad file name '{}'", file_name)))?;

        let url = format!("{}/data/{}/{}", self.base_url, data.id, file_name);
        debug!("Downloading {}", url);
        let response = self.client.get(&url).send().await?;
        let bytes = self.handle_bytes_response(response).await?;

        let path = dir.join(local_name);
        tokio::fs::write(&path, &bytes).await?;

        info!("Downloaded {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}
