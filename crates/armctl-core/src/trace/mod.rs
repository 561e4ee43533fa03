//! Diagnostic trace capture for remote management calls
//!
//! A `TraceContext` is the registration point the HTTP machinery reports
//! to. Commands attach a `TraceCollector` for the duration of their remote
//! calls (retried ones included) and read its ordered records afterwards.
//!
//! Only informational messages and formatted request/response pairs are
//! captured. Configuration notices and per-method enter/exit/error events
//! are dropped before they reach any collector.
//!
//! # Example
//!
//! ```rust
//! use armctl_core::trace::{TraceCollector, TraceContext, TracedRequest};
//! use std::sync::Arc;
//!
//! let context = TraceContext::new();
//! let guard = context.attach(Arc::new(TraceCollector::new())).unwrap();
//!
//! context.information("resolving VM location");
//! context.send_request(Some(&TracedRequest::new("GET", "https://management.azure.com/vm")));
//!
//! let records = guard.finish();
//! assert_eq!(records.len(), 2);
//! ```

mod collector;
mod context;
mod format;
mod record;

pub use collector::TraceCollector;
pub use context::{AttachMode, TraceContext, TraceError, TraceGuard};
pub use format::{
    format_request, format_request_with, format_response, format_response_with, FormatOptions,
    TracedRequest, TracedResponse,
};
pub use record::{TraceFilter, TraceKind, TraceRecord};
