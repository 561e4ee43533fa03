//! Error types for armctl-client

use std::time::Duration;

use armctl_core::remote::{RemoteError, StructuredError};
use armctl_core::retry::Classify;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The management call itself failed
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("no subscription id configured (set ARMCTL_SUBSCRIPTION_ID or endpoints.subscription-id)")]
    MissingSubscription,

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("failed to build request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("failed to decode {what} response: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("long-running operation did not finish within {0:?}")]
    PollTimeout(Duration),
}

impl ClientError {
    pub fn invalid_url(url: impl Into<String>, source: url::ParseError) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            source,
        }
    }

    /// The underlying remote error, if the call reached the service
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            ClientError::Remote(err) => Some(err),
            _ => None,
        }
    }
}

impl Classify for ClientError {
    fn structured(&self) -> Option<&StructuredError> {
        self.remote().and_then(Classify::structured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armctl_core::remote::OperationStatus;

    #[test]
    fn test_only_remote_errors_are_classifiable() {
        let remote = ClientError::from(RemoteError::operation_failed(
            OperationStatus::Failed,
            "InternalExecutionError",
        ));
        assert_eq!(remote.structured().unwrap().code(), "InternalExecutionError");

        assert!(ClientError::MissingSubscription.structured().is_none());
        assert!(ClientError::PollTimeout(Duration::from_secs(1))
            .structured()
            .is_none());
    }

    #[test]
    fn test_remote_display_is_transparent() {
        let err = ClientError::from(RemoteError::transport("connection reset"));
        assert_eq!(err.to_string(), "transport error: connection reset");
    }
}
