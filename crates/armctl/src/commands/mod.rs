//! CLI command implementations

pub mod datalake;
pub mod vm;

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use armctl_client::{ClientOptions, ManagementClient};
use armctl_core::trace::{TraceCollector, TraceContext};
use armctl_core::types::RuntimeConfig;
use armctl_core::HierarchicalConfigLoader;

use crate::cli::{Cli, OutputFormat};
use crate::output;

/// Per-invocation state shared by every command
pub struct CommandContext {
    pub config: RuntimeConfig,
    pub output: OutputFormat,
    pub quiet: bool,
    debug: bool,
    token: Option<String>,
    trace: TraceContext,
}

impl CommandContext {
    /// Resolve configuration and global flags
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut loader = HierarchicalConfigLoader::new()?;
        if let Some(path) = &cli.config {
            loader = loader.with_file(path.clone());
        }
        let mut config = loader
            .load_runtime_config()
            .context("Failed to load runtime configuration")?;

        // CLI flags sit above every other configuration layer
        if let Some(subscription) = &cli.subscription {
            config.endpoints.subscription_id = Some(subscription.clone());
        }

        let trace = TraceContext::new().with_redaction(config.trace.redact_authorization);

        Ok(Self {
            debug: cli.debug || config.trace.enabled,
            output: cli.output,
            quiet: cli.quiet,
            token: cli.token.clone(),
            trace,
            config,
        })
    }

    /// Build a management client that reports to this command's trace context
    pub fn client(&self) -> Result<ManagementClient> {
        let mut client = ManagementClient::new(ClientOptions::from_config(&self.config))?
            .with_trace(self.trace.clone());
        if let Some(token) = &self.token {
            client = client.with_token(token.clone());
        } else {
            tracing::warn!("no access token provided; requests will be unauthenticated");
        }
        Ok(client)
    }

    /// Run `work` with a trace collector attached when `--debug` is active
    ///
    /// Captured records are printed whether or not `work` succeeds.
    pub async fn traced<T, F>(&self, work: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if !self.debug {
            return work.await;
        }

        let guard = self.trace.attach(Arc::new(TraceCollector::new()))?;
        let result = work.await;
        output::trace_records(&guard.finish());
        result
    }
}
