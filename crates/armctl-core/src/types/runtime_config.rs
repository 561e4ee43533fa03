//! Runtime configuration types for operational parameters
//!
//! These types define configuration that controls runtime behavior like
//! management endpoints, HTTP timeouts, retry policies and trace capture.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name of the retry policy used for VM extension create/update calls
pub const EXTENSION_CREATE_POLICY: &str = "extension-create";

/// Complete runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// Network and HTTP configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// Management API endpoints
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Retry policy configurations
    #[serde(default)]
    pub retry_policies: RetryPoliciesConfig,

    /// Diagnostic trace capture
    #[serde(default)]
    pub trace: TraceConfig,
}

/// Network and HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// HTTP timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Delay between status polls of a long-running operation
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout(),
            user_agent: default_user_agent(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

fn default_http_timeout() -> u64 {
    300 // 5 minutes
}
fn default_poll_interval() -> u64 {
    5000
}
fn default_user_agent() -> String {
    format!(
        "armctl/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Management API endpoints and versions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EndpointsConfig {
    /// Resource manager base URL
    #[serde(default = "default_resource_manager_url")]
    pub resource_manager_url: String,

    /// DNS suffix for per-account Data Lake Analytics catalog endpoints
    #[serde(default = "default_catalog_dns_suffix")]
    pub catalog_dns_suffix: String,

    /// Fixed catalog endpoint used for every account instead of the DNS suffix
    #[serde(default)]
    pub catalog_url: Option<String>,

    /// Subscription that resource-group scoped calls target
    #[serde(default)]
    pub subscription_id: Option<String>,

    /// api-version for compute calls
    #[serde(default = "default_compute_api_version")]
    pub compute_api_version: String,

    /// api-version for catalog calls
    #[serde(default = "default_catalog_api_version")]
    pub catalog_api_version: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            resource_manager_url: default_resource_manager_url(),
            catalog_dns_suffix: default_catalog_dns_suffix(),
            catalog_url: None,
            subscription_id: None,
            compute_api_version: default_compute_api_version(),
            catalog_api_version: default_catalog_api_version(),
        }
    }
}

fn default_resource_manager_url() -> String {
    "https://management.azure.com".to_string()
}
fn default_catalog_dns_suffix() -> String {
    "azuredatalakeanalytics.net".to_string()
}
fn default_compute_api_version() -> String {
    "2016-03-30".to_string()
}
fn default_catalog_api_version() -> String {
    "2015-10-01-preview".to_string()
}

/// Retry policy configurations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPoliciesConfig {
    /// Default retry policy
    #[serde(default)]
    pub default: RetryPolicy,

    /// Per-operation retry policies
    #[serde(default)]
    pub operations: HashMap<String, RetryPolicy>,
}

impl Default for RetryPoliciesConfig {
    fn default() -> Self {
        let mut operations = HashMap::new();

        // Extension PUTs absorb one service-restart fault with an immediate resubmit
        operations.insert(
            EXTENSION_CREATE_POLICY.to_string(),
            RetryPolicy {
                max_attempts: 2,
                strategy: RetryStrategy::None,
                ..RetryPolicy::default()
            },
        );

        Self {
            default: RetryPolicy::default(),
            operations,
        }
    }
}

impl RetryPoliciesConfig {
    /// Policy for a named operation, falling back to the default policy
    pub fn policy_for(&self, operation: &str) -> RetryPolicy {
        self.operations
            .get(operation)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }
}

/// Retry policy for an operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay strategy between attempts
    #[serde(default)]
    pub strategy: RetryStrategy,

    /// Backoff multiplier for exponential strategies
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            strategy: RetryStrategy::default(),
            backoff_multiplier: default_backoff_multiplier(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

impl RetryPolicy {
    /// A policy that makes `max_attempts` immediate attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            strategy: RetryStrategy::None,
            ..Self::default()
        }
    }
}

fn default_max_attempts() -> u32 {
    2
}
fn default_backoff_multiplier() -> f64 {
    2.0
}
fn default_initial_delay() -> u64 {
    1000
}
fn default_max_delay() -> u64 {
    30000
}

/// Retry strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RetryStrategy {
    /// Retry immediately (default)
    #[default]
    None,

    /// Fixed delay between retries
    FixedDelay,

    /// Exponential backoff
    ExponentialBackoff,

    /// Linear backoff
    LinearBackoff,
}

/// Trace capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TraceConfig {
    /// Capture HTTP traffic for every command, as if `--debug` was passed
    #[serde(default)]
    pub enabled: bool,

    /// Replace Authorization header values in formatted requests
    #[serde(default = "default_redact_authorization")]
    pub redact_authorization: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            redact_authorization: default_redact_authorization(),
        }
    }
}

fn default_redact_authorization() -> bool {
    true
}
