//! SQL Server IaaS agent extension settings
//!
//! The agent reads PascalCase keys. Backup credentials travel only in the
//! protected settings, never in the public ones.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::compute::{ExtensionProperties, VirtualMachineExtension};

/// Automated patching window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AutoPatchingSettings {
    pub enable: bool,
    pub day_of_week: String,
    pub maintenance_window_starting_hour: u32,
    pub maintenance_window_duration: u32,
    pub patch_category: String,
}

/// Automated backup configuration
///
/// Storage credentials and the encryption password are not serialized
/// here; they move to `SqlServerPrivateSettings`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AutoBackupSettings {
    pub enable: bool,
    pub enable_encryption: bool,
    pub retention_period: u32,
    #[serde(skip)]
    pub storage_url: String,
    #[serde(skip)]
    pub storage_access_key: String,
    #[serde(skip)]
    pub password: String,
}

impl fmt::Debug for AutoBackupSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoBackupSettings")
            .field("enable", &self.enable)
            .field("enable_encryption", &self.enable_encryption)
            .field("retention_period", &self.retention_period)
            .field("storage_url", &self.storage_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AutoTelemetrySettings {
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SqlServerPublicSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_patching_settings: Option<AutoPatchingSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_backup_settings: Option<AutoBackupSettings>,
    pub auto_telemetry_settings: AutoTelemetrySettings,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SqlServerPrivateSettings {
    pub storage_url: String,
    pub storage_access_key: String,
    pub password: String,
}

impl fmt::Debug for SqlServerPrivateSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlServerPrivateSettings")
            .field("storage_url", &self.storage_url)
            .finish_non_exhaustive()
    }
}

/// Builder for the SQL Server IaaS agent extension resource
#[derive(Debug, Clone)]
pub struct SqlServerExtension {
    location: String,
    version: Option<String>,
    auto_patching: Option<AutoPatchingSettings>,
    auto_backup: Option<AutoBackupSettings>,
}

impl SqlServerExtension {
    pub const PUBLISHER: &'static str = "Microsoft.SqlServer.Management";
    pub const EXTENSION_TYPE: &'static str = "SqlIaaSAgent";
    pub const DEFAULT_VERSION: &'static str = "1.2";

    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            version: None,
            auto_patching: None,
            auto_backup: None,
        }
    }

    /// Handler version; empty or absent selects `DEFAULT_VERSION`
    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version.filter(|v| !v.is_empty());
        self
    }

    pub fn with_auto_patching(mut self, settings: Option<AutoPatchingSettings>) -> Self {
        self.auto_patching = settings;
        self
    }

    pub fn with_auto_backup(mut self, settings: Option<AutoBackupSettings>) -> Self {
        self.auto_backup = settings;
        self
    }

    /// Resource name used when the caller does not pick one
    pub fn default_name() -> String {
        format!("{}.{}", Self::PUBLISHER, Self::EXTENSION_TYPE)
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or(Self::DEFAULT_VERSION)
    }

    pub fn public_settings(&self) -> SqlServerPublicSettings {
        SqlServerPublicSettings {
            auto_patching_settings: self.auto_patching.clone(),
            auto_backup_settings: self.auto_backup.clone(),
            auto_telemetry_settings: AutoTelemetrySettings {
                region: self.location.clone(),
            },
        }
    }

    /// Backup credentials, or empty strings when backup is not configured
    pub fn private_settings(&self) -> SqlServerPrivateSettings {
        match &self.auto_backup {
            Some(backup) => SqlServerPrivateSettings {
                storage_url: backup.storage_url.clone(),
                storage_access_key: backup.storage_access_key.clone(),
                password: backup.password.clone(),
            },
            None => SqlServerPrivateSettings::default(),
        }
    }

    pub fn to_extension(&self) -> Result<VirtualMachineExtension, serde_json::Error> {
        Ok(VirtualMachineExtension {
            location: self.location.clone(),
            properties: ExtensionProperties {
                publisher: Self::PUBLISHER.to_string(),
                extension_type: Self::EXTENSION_TYPE.to_string(),
                type_handler_version: self.version().to_string(),
                settings: Some(serde_json::to_value(self.public_settings())?),
                protected_settings: Some(serde_json::to_value(self.private_settings())?),
                provisioning_state: None,
            },
            ..Default::default()
        })
    }
}
