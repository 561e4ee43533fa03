//! Collector registration and event dispatch

use std::fmt::Display;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use super::collector::TraceCollector;
use super::format::{
    format_request_with, format_response_with, FormatOptions, TracedRequest, TracedResponse,
};
use super::record::{TraceKind, TraceRecord};

/// Errors from attaching or detaching collectors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    #[error("trace collector {id} is already attached")]
    AlreadyAttached { id: Uuid },

    #[error("trace collector {id} is not attached")]
    NotAttached { id: Uuid },
}

/// How many collectors a context admits at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachMode {
    /// Any number of collectors; each receives every event it accepts
    #[default]
    Multiplexed,
    /// At most one collector; a second attach is rejected
    Exclusive,
}

/// Registration point for trace collectors
///
/// Clones share the same set of attached collectors, so the context can be
/// handed to HTTP clients while the command holds the `TraceGuard`.
#[derive(Debug, Clone, Default)]
pub struct TraceContext {
    collectors: Arc<RwLock<Vec<Arc<TraceCollector>>>>,
    mode: AttachMode,
    format: FormatOptions,
}

impl TraceContext {
    /// Context that multiplexes events to every attached collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that admits a single collector at a time
    pub fn exclusive() -> Self {
        Self {
            mode: AttachMode::Exclusive,
            ..Self::default()
        }
    }

    pub fn with_redaction(mut self, redact_authorization: bool) -> Self {
        self.format.redact_authorization = redact_authorization;
        self
    }

    pub fn mode(&self) -> AttachMode {
        self.mode
    }

    /// Whether any collector is attached
    pub fn is_active(&self) -> bool {
        !self.read().is_empty()
    }

    /// Start delivering events to `collector`
    ///
    /// The collector stays attached until the returned guard is finished or
    /// dropped, or until `detach` is called with its id.
    pub fn attach(&self, collector: Arc<TraceCollector>) -> Result<TraceGuard, TraceError> {
        let mut active = self.write();

        if active.iter().any(|c| c.id() == collector.id()) {
            return Err(TraceError::AlreadyAttached { id: collector.id() });
        }
        if self.mode == AttachMode::Exclusive {
            if let Some(existing) = active.first() {
                return Err(TraceError::AlreadyAttached { id: existing.id() });
            }
        }

        tracing::debug!(collector = %collector.id(), "trace collector attached");
        active.push(collector.clone());

        Ok(TraceGuard {
            context: self.clone(),
            collector,
            detached: false,
        })
    }

    /// Stop delivering events to the collector with `id`
    pub fn detach(&self, id: Uuid) -> Result<Arc<TraceCollector>, TraceError> {
        let mut active = self.write();
        let index = active
            .iter()
            .position(|c| c.id() == id)
            .ok_or(TraceError::NotAttached { id })?;

        tracing::debug!(collector = %id, "trace collector detached");
        Ok(active.remove(index))
    }

    /// Deliver one event to every attached collector that accepts its kind
    ///
    /// Non-capturable kinds are dropped without touching any collector.
    pub fn record(&self, kind: TraceKind, payload: impl Into<String>) {
        if !kind.is_capturable() {
            return;
        }

        let active = self.read();
        if active.is_empty() {
            return;
        }

        let record = TraceRecord::new(kind, payload.into(), Utc::now());
        for collector in active.iter().filter(|c| c.accepts(kind)) {
            collector.push(record.clone());
        }
    }

    pub fn configuration(&self, name: &str, value: &str) {
        self.record(TraceKind::Configuration, format!("{} = {}", name, value));
    }

    pub fn enter_method(&self, method: &str) {
        self.record(TraceKind::MethodEnter, method);
    }

    pub fn exit_method(&self, method: &str) {
        self.record(TraceKind::MethodExit, method);
    }

    pub fn trace_error(&self, error: &dyn Display) {
        self.record(TraceKind::MethodError, error.to_string());
    }

    pub fn information(&self, message: impl Into<String>) {
        self.record(TraceKind::Information, message);
    }

    /// Record a formatted outbound request; `None` records an empty entry
    pub fn send_request(&self, request: Option<&TracedRequest>) {
        if self.is_active() {
            self.record(TraceKind::Request, format_request_with(request, &self.format));
        }
    }

    /// Record a formatted inbound response; `None` records an empty entry
    pub fn receive_response(&self, response: Option<&TracedResponse>) {
        if self.is_active() {
            self.record(TraceKind::Response, format_response_with(response, &self.format));
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<TraceCollector>>> {
        self.collectors.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<TraceCollector>>> {
        self.collectors.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Attachment handle returned by `TraceContext::attach`
///
/// Dropping the guard detaches the collector.
#[derive(Debug)]
pub struct TraceGuard {
    context: TraceContext,
    collector: Arc<TraceCollector>,
    detached: bool,
}

impl TraceGuard {
    pub fn collector(&self) -> &Arc<TraceCollector> {
        &self.collector
    }

    pub fn id(&self) -> Uuid {
        self.collector.id()
    }

    /// Detach the collector and return everything it captured
    pub fn finish(mut self) -> Vec<TraceRecord> {
        self.release();
        self.collector.drain()
    }

    fn release(&mut self) {
        if !self.detached {
            self.detached = true;
            // Already gone if someone called detach() with our id
            let _ = self.context.detach(self.collector.id());
        }
    }
}

impl Drop for TraceGuard {
    fn drop(&mut self) {
        self.release();
    }
}
