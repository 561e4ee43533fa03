//! # armctl-core
//!
//! Core library for the armctl CLI providing:
//! - Retry execution engine with classification-based retry decisions
//! - Remote error model for resource-management API failures
//! - Diagnostic trace capture for outbound/inbound HTTP traffic
//! - Runtime configuration loading (embedded defaults, file, environment)

pub mod config;
pub mod error;
pub mod remote;
pub mod retry;
pub mod trace;
pub mod types;

pub use config::HierarchicalConfigLoader;
pub use error::{Error, Result};
pub use remote::{OperationStatus, RemoteError, StructuredError};
pub use trace::{TraceCollector, TraceContext, TraceGuard, TraceKind, TraceRecord};
