//! Data Lake Analytics catalog API

use async_trait::async_trait;
use tracing::info;

use crate::client::ManagementClient;
use crate::error::Result;
use crate::models::{CatalogSecret, CatalogSecretRequest};

/// U-SQL catalog operations
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Create a credential secret in a catalog database
    async fn create_secret(
        &self,
        account: &str,
        database: &str,
        request: &CatalogSecretRequest,
    ) -> Result<CatalogSecret>;
}

#[async_trait]
impl CatalogApi for ManagementClient {
    async fn create_secret(
        &self,
        account: &str,
        database: &str,
        request: &CatalogSecretRequest,
    ) -> Result<CatalogSecret> {
        let url = self.catalog_url(
            account,
            &[
                "catalog",
                "usql",
                "databases",
                database,
                "secrets",
                request.secret_name.as_str(),
            ],
        )?;

        info!(account, database, secret = %request.secret_name, "creating catalog secret");
        let raw = self.send(self.http().put(url).json(request)).await?;

        // Some service versions acknowledge with an empty body
        if raw.body.trim().is_empty() {
            return Ok(CatalogSecret {
                database_name: Some(database.to_string()),
                secret_name: Some(request.secret_name.clone()),
                creation_time: None,
                uri: Some(request.uri.clone()),
            });
        }
        Ok(raw.decode::<CatalogSecret>("catalog secret")?.body)
    }
}
