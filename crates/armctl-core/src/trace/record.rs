//! Trace record types

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Kind of diagnostic event reported by the remote-call machinery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraceKind {
    /// Client configuration notice (never captured)
    Configuration,
    /// Entry into a client method (never captured)
    MethodEnter,
    /// Exit from a client method (never captured)
    MethodExit,
    /// Error raised inside a client method (never captured)
    MethodError,
    /// Free-form informational message
    Information,
    /// Formatted outbound request
    Request,
    /// Formatted inbound response
    Response,
}

impl TraceKind {
    /// Whether events of this kind can ever be stored by a collector
    pub fn is_capturable(self) -> bool {
        matches!(
            self,
            TraceKind::Information | TraceKind::Request | TraceKind::Response
        )
    }
}

impl fmt::Display for TraceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TraceKind::Configuration => "configuration",
            TraceKind::MethodEnter => "method-enter",
            TraceKind::MethodExit => "method-exit",
            TraceKind::MethodError => "method-error",
            TraceKind::Information => "information",
            TraceKind::Request => "request",
            TraceKind::Response => "response",
        };
        f.write_str(s)
    }
}

/// One captured diagnostic event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceRecord {
    kind: TraceKind,
    text: String,
    recorded_at: DateTime<Utc>,
}

impl TraceRecord {
    pub(crate) fn new(kind: TraceKind, text: String, recorded_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            text,
            recorded_at,
        }
    }

    pub fn kind(&self) -> TraceKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Which capturable kinds a collector stores
///
/// Non-capturable kinds are rejected whatever the filter says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceFilter {
    pub information: bool,
    pub requests: bool,
    pub responses: bool,
}

impl TraceFilter {
    /// Capture messages, requests and responses
    pub fn all() -> Self {
        Self {
            information: true,
            requests: true,
            responses: true,
        }
    }

    /// Capture request/response pairs only
    pub fn http_only() -> Self {
        Self {
            information: false,
            ..Self::all()
        }
    }

    /// Capture informational messages only
    pub fn messages_only() -> Self {
        Self {
            information: true,
            requests: false,
            responses: false,
        }
    }

    pub fn accepts(&self, kind: TraceKind) -> bool {
        match kind {
            TraceKind::Information => self.information,
            TraceKind::Request => self.requests,
            TraceKind::Response => self.responses,
            TraceKind::Configuration
            | TraceKind::MethodEnter
            | TraceKind::MethodExit
            | TraceKind::MethodError => false,
        }
    }
}

impl Default for TraceFilter {
    fn default() -> Self {
        Self::all()
    }
}
