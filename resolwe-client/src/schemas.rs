//! Storage and descriptor schema endpoints

use crate::ResolweClient;
use crate::error::{ClientError, Result};
use resolwe_core::domain::descriptor::DescriptorSchema;
use resolwe_core::domain::storage::Storage;

impl ResolweClient {
    /// Get a storage object by ID
    pub async fn get_storage(&self, id: u64) -> Result<Storage> {
        let url = format!("{}/api/storage/{}", self.base_url, id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Get the latest descriptor schema with the given slug
    pub async fn get_descriptor_schema(&self, slug: &str) -> Result<DescriptorSchema> {
        let url = format!("{}/api/descriptorschema", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("slug", slug)])
            .send()
            .await?;

        let schemas: Vec<DescriptorSchema> = self.handle_response(response).await?;
        schemas
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::NotFound(format!("descriptor schema '{}'", slug)))
    }
}
