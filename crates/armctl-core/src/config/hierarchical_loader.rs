//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Runtime config (~/.armctl/armctl-runtime.yaml, or an explicit `--config` file)
//! 3. Environment variables (ARMCTL_* prefix)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::types::{RetryPoliciesConfig, RuntimeConfig};
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;
use std::env;
use std::fs;

const RUNTIME_CONFIG_FILE: &str = "armctl-runtime.yaml";

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Base directory for configuration files
    config_dir: Utf8PathBuf,

    /// Explicit runtime config file replacing the one in `config_dir`
    explicit_file: Option<Utf8PathBuf>,
}

impl HierarchicalConfigLoader {
    /// Create a new hierarchical config loader
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self::with_dir(config_dir))
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self {
            config_dir,
            explicit_file: None,
        }
    }

    /// Read runtime configuration from `path` instead of the config directory
    ///
    /// Unlike the default location, an explicit file must exist.
    pub fn with_file(mut self, path: Utf8PathBuf) -> Self {
        self.explicit_file = Some(path);
        self
    }

    /// Get the standard config directory (~/.armctl)
    fn get_config_dir() -> Result<Utf8PathBuf> {
        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| Error::invalid_config("Could not determine home directory"))?;

        Ok(Utf8PathBuf::from(home).join(".armctl"))
    }

    /// Path of the runtime config file that `load_runtime_config` reads
    pub fn runtime_config_path(&self) -> Utf8PathBuf {
        self.explicit_file
            .clone()
            .unwrap_or_else(|| self.config_dir.join(RUNTIME_CONFIG_FILE))
    }

    /// Load runtime configuration with hierarchical precedence
    pub fn load_runtime_config(&self) -> Result<RuntimeConfig> {
        // Start with embedded defaults
        let mut config = Self::load_embedded_config::<RuntimeConfig>("runtime-defaults.yaml")?;

        let runtime_config_path = self.runtime_config_path();
        if runtime_config_path.exists() {
            tracing::debug!(path = %runtime_config_path, "loading runtime config");
            let file_config = self.load_yaml_file::<RuntimeConfig>(&runtime_config_path)?;
            config = Self::merge_runtime_config(config, file_config);
        } else if self.explicit_file.is_some() {
            return Err(Error::config_not_found(runtime_config_path.as_str()));
        }

        // Apply environment variable overrides
        config = self.apply_env_overrides(config)?;

        Ok(config)
    }

    /// Load an embedded configuration file
    fn load_embedded_config<T: DeserializeOwned>(filename: &str) -> Result<T> {
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", filename))
        })?;

        let config: T = serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                filename, e
            ))
        })?;

        Ok(config)
    }

    /// Load a YAML file and parse it
    fn load_yaml_file<T: DeserializeOwned>(&self, path: &Utf8Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        let config: T = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))?;
        Ok(config)
    }

    /// Merge two runtime configs (base is overridden by overlay)
    fn merge_runtime_config(base: RuntimeConfig, overlay: RuntimeConfig) -> RuntimeConfig {
        RuntimeConfig {
            network: overlay.network,
            endpoints: overlay.endpoints,
            retry_policies: Self::merge_retry_policies(base.retry_policies, overlay.retry_policies),
            trace: overlay.trace,
        }
    }

    /// Merge retry policies
    fn merge_retry_policies(
        mut base: RetryPoliciesConfig,
        overlay: RetryPoliciesConfig,
    ) -> RetryPoliciesConfig {
        for (key, policy) in overlay.operations {
            base.operations.insert(key, policy);
        }
        base.default = overlay.default;
        base
    }

    /// Apply environment variable overrides to runtime config
    fn apply_env_overrides(&self, mut config: RuntimeConfig) -> Result<RuntimeConfig> {
        // Network
        if let Ok(val) = env::var("ARMCTL_HTTP_TIMEOUT_SECS") {
            config.network.http_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("ARMCTL_HTTP_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("ARMCTL_POLL_INTERVAL_MS") {
            config.network.poll_interval_ms = val.parse().map_err(|_| {
                Error::invalid_config("ARMCTL_POLL_INTERVAL_MS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("ARMCTL_USER_AGENT") {
            config.network.user_agent = val;
        }

        // Endpoints
        if let Ok(val) = env::var("ARMCTL_RESOURCE_MANAGER_URL") {
            config.endpoints.resource_manager_url = val;
        }

        if let Ok(val) = env::var("ARMCTL_CATALOG_DNS_SUFFIX") {
            config.endpoints.catalog_dns_suffix = val;
        }

        if let Ok(val) = env::var("ARMCTL_CATALOG_URL") {
            config.endpoints.catalog_url = Some(val);
        }

        if let Ok(val) = env::var("ARMCTL_SUBSCRIPTION_ID") {
            config.endpoints.subscription_id = Some(val);
        }

        // Trace capture
        if let Ok(val) = env::var("ARMCTL_TRACE") {
            config.trace.enabled = val.parse().unwrap_or(false);
        }

        if let Ok(val) = env::var("ARMCTL_TRACE_REDACT") {
            config.trace.redact_authorization = val.parse().unwrap_or(true);
        }

        Ok(config)
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}
