//! Data Lake Analytics U-SQL catalog models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of a catalog secret create request
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSecretRequest {
    #[serde(skip)]
    pub secret_name: String,
    pub password: String,
    pub uri: String,
}

impl CatalogSecretRequest {
    pub fn new(
        secret_name: impl Into<String>,
        password: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        Self {
            secret_name: secret_name.into(),
            password: password.into(),
            uri: uri.into(),
        }
    }
}

impl fmt::Debug for CatalogSecretRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogSecretRequest")
            .field("secret_name", &self.secret_name)
            .field("uri", &self.uri)
            .finish_non_exhaustive()
    }
}

/// A secret stored in a catalog database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSecret {
    #[serde(default)]
    pub database_name: Option<String>,
    #[serde(default)]
    pub secret_name: Option<String>,
    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub uri: Option<String>,
}
