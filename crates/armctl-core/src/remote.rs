//! Remote error model for resource-management API failures
//!
//! A failed management call surfaces as one of three shapes: the call never
//! completed (transport), the service returned a parseable long-running
//! operation error body, or it returned a body that could not be parsed.
//! Only the structured shape carries the status/code pair the retry
//! classifiers look at.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::retry::Classify;

/// Status of a long-running management operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OperationStatus {
    InProgress,
    Succeeded,
    Failed,
    Canceled,
    /// Missing or unrecognised status value
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationStatus::InProgress => "InProgress",
            OperationStatus::Succeeded => "Succeeded",
            OperationStatus::Failed => "Failed",
            OperationStatus::Canceled => "Canceled",
            OperationStatus::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Error body returned by the service for a failed long-running operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongRunningOperationError {
    #[serde(default)]
    pub operation_id: Option<String>,

    #[serde(default)]
    pub status: OperationStatus,

    #[serde(default)]
    pub start_time: Option<String>,

    #[serde(default)]
    pub end_time: Option<String>,

    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

/// Code/message pair nested inside an operation error body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

/// The classifiable part of a remote failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredError {
    pub status: OperationStatus,
    pub code: Option<String>,
    pub message: Option<String>,
}

impl StructuredError {
    /// Create a structured error from a status and code
    pub fn new(status: OperationStatus, code: impl Into<String>) -> Self {
        Self {
            status,
            code: Some(code.into()),
            message: None,
        }
    }

    /// Attach a human-readable message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Error code, or the empty string when the body carried none
    pub fn code(&self) -> &str {
        self.code.as_deref().unwrap_or_default()
    }
}

impl From<LongRunningOperationError> for StructuredError {
    fn from(body: LongRunningOperationError) -> Self {
        let (code, message) = match body.error {
            Some(detail) => (detail.code, detail.message),
            None => (None, None),
        };
        Self {
            status: body.status,
            code,
            message,
        }
    }
}

impl fmt::Display for StructuredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation {}", self.status)?;
        if let Some(code) = &self.code {
            write!(f, " ({})", code)?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

/// A failed remote management call
#[derive(Error, Debug, Clone)]
pub enum RemoteError {
    /// The call could not complete (connection failure, transport timeout)
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The service returned a parseable error body
    #[error("remote call failed{}: {error}", http_suffix(.http_status))]
    Structured {
        http_status: Option<u16>,
        error: StructuredError,
    },

    /// The service returned an error body that could not be parsed
    #[error("malformed error body{}: {reason}", http_suffix(.http_status))]
    MalformedErrorBody {
        http_status: Option<u16>,
        body: String,
        reason: String,
    },
}

fn http_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

impl RemoteError {
    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a structured failure without an HTTP status
    pub fn operation_failed(status: OperationStatus, code: impl Into<String>) -> Self {
        Self::Structured {
            http_status: None,
            error: StructuredError::new(status, code),
        }
    }

    /// Build a remote error from a non-success HTTP response
    ///
    /// The body must be a JSON object shaped like a long-running operation
    /// error. Missing fields default; anything that is not such an object
    /// becomes `MalformedErrorBody`.
    pub fn from_response(http_status: u16, body: &str) -> Self {
        match serde_json::from_str::<LongRunningOperationError>(body) {
            Ok(parsed) => Self::Structured {
                http_status: Some(http_status),
                error: parsed.into(),
            },
            Err(e) => Self::MalformedErrorBody {
                http_status: Some(http_status),
                body: body.to_string(),
                reason: e.to_string(),
            },
        }
    }

    /// HTTP status of the failed response, if one was received
    pub fn http_status(&self) -> Option<u16> {
        match self {
            RemoteError::Transport { .. } => None,
            RemoteError::Structured { http_status, .. } => *http_status,
            RemoteError::MalformedErrorBody { http_status, .. } => *http_status,
        }
    }

    /// Check if this is a transport failure
    pub fn is_transport(&self) -> bool {
        matches!(self, RemoteError::Transport { .. })
    }

    /// Check if the error body could not be parsed
    pub fn is_malformed(&self) -> bool {
        matches!(self, RemoteError::MalformedErrorBody { .. })
    }
}

impl Classify for RemoteError {
    fn structured(&self) -> Option<&StructuredError> {
        match self {
            RemoteError::Structured { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_internal_execution_error() {
        let body = r#"{
            "operationId": "7c3c5b21-6d0f-4e7a-9c1e-2f0d3b9f6c10",
            "status": "Failed",
            "startTime": "2016-03-02T18:01:12.5Z",
            "endTime": "2016-03-02T18:02:40.1Z",
            "error": {
                "code": "InternalExecutionError",
                "message": "An internal execution error occurred."
            }
        }"#;

        let err = RemoteError::from_response(500, body);
        let structured = err.structured().expect("should be structured");
        assert_eq!(structured.status, OperationStatus::Failed);
        assert_eq!(structured.code(), "InternalExecutionError");
        assert_eq!(err.http_status(), Some(500));
    }

    #[test]
    fn test_parse_body_without_status() {
        let body = r#"{"error":{"code":"ResourceNotFound","message":"VM not found"}}"#;

        let err = RemoteError::from_response(404, body);
        let structured = err.structured().unwrap();
        assert_eq!(structured.status, OperationStatus::Unknown);
        assert_eq!(structured.code(), "ResourceNotFound");
    }

    #[test]
    fn test_unrecognised_status_maps_to_unknown() {
        let body = r#"{"status":"Deallocating"}"#;

        let err = RemoteError::from_response(409, body);
        assert_eq!(err.structured().unwrap().status, OperationStatus::Unknown);
        assert_eq!(err.structured().unwrap().code, None);
    }

    #[test]
    fn test_non_json_body_is_malformed() {
        let err = RemoteError::from_response(502, "<html>Bad Gateway</html>");
        assert!(err.is_malformed());
        assert!(err.structured().is_none());
    }

    #[test]
    fn test_empty_body_is_malformed() {
        let err = RemoteError::from_response(500, "");
        assert!(err.is_malformed());
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        let err = RemoteError::from_response(500, r#"{"status": 42}"#);
        assert!(err.is_malformed());
    }

    #[test]
    fn test_transport_is_not_classifiable() {
        let err = RemoteError::transport("connection refused");
        assert!(err.is_transport());
        assert!(err.structured().is_none());
        assert_eq!(err.http_status(), None);
    }

    #[test]
    fn test_display() {
        let err = RemoteError::from_response(
            500,
            r#"{"status":"Failed","error":{"code":"InternalExecutionError","message":"restart"}}"#,
        );
        let display = err.to_string();
        assert!(display.contains("HTTP 500"));
        assert!(display.contains("Failed"));
        assert!(display.contains("InternalExecutionError"));
        assert!(display.contains("restart"));
    }
}
