//! HTTP management client
//!
//! Every call goes through `ManagementClient::send`, which reports the
//! outbound request and the inbound response to the attached
//! `TraceContext` and turns non-success responses into `RemoteError`s.

use std::time::Duration;

use armctl_core::remote::{LongRunningOperationError, OperationStatus, RemoteError};
use armctl_core::trace::{TraceContext, TracedRequest, TracedResponse};
use armctl_core::types::RuntimeConfig;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::error::{ClientError, Result};
use crate::models::OperationResponse;

const CLIENT_REQUEST_ID: &str = "x-ms-client-request-id";
const REQUEST_ID: &str = "x-ms-request-id";
const ASYNC_OPERATION: &str = "azure-asyncoperation";

/// Endpoints, versions and timeouts used by `ManagementClient`
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub resource_manager_url: String,
    pub catalog_dns_suffix: String,
    /// Fixed catalog endpoint replacing `https://{account}.{catalog_dns_suffix}`
    pub catalog_url: Option<String>,
    pub subscription_id: Option<String>,
    pub compute_api_version: String,
    pub catalog_api_version: String,
    pub user_agent: String,
    /// Per-request timeout, also the upper bound on long-running operation polling
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl ClientOptions {
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            resource_manager_url: config.endpoints.resource_manager_url.clone(),
            catalog_dns_suffix: config.endpoints.catalog_dns_suffix.clone(),
            catalog_url: config.endpoints.catalog_url.clone(),
            subscription_id: config.endpoints.subscription_id.clone(),
            compute_api_version: config.endpoints.compute_api_version.clone(),
            catalog_api_version: config.endpoints.catalog_api_version.clone(),
            user_agent: config.network.user_agent.clone(),
            timeout: Duration::from_secs(config.network.http_timeout_secs),
            poll_interval: Duration::from_millis(config.network.poll_interval_ms),
        }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::from_config(&RuntimeConfig::default())
    }
}

/// Client for the resource-management and catalog APIs
pub struct ManagementClient {
    http: reqwest::Client,
    options: ClientOptions,
    token: Option<String>,
    trace: TraceContext,
}

impl ManagementClient {
    pub fn new(options: ClientOptions) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(options.user_agent.as_str())
            .timeout(options.timeout)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            http,
            options,
            token: None,
            trace: TraceContext::new(),
        })
    }

    /// Set the bearer token sent with every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Report traffic to `trace` instead of a private context
    pub fn with_trace(mut self, trace: TraceContext) -> Self {
        self.trace = trace;
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn trace(&self) -> &TraceContext {
        &self.trace
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn subscription_id(&self) -> Result<&str> {
        self.options
            .subscription_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ClientError::MissingSubscription)
    }

    /// Resource-manager URL for `segments` (each percent-encoded)
    pub(crate) fn management_url(&self, segments: &[&str], api_version: &str) -> Result<Url> {
        build_url(&self.options.resource_manager_url, segments, api_version)
    }

    /// Catalog URL for `account` and `segments`
    pub(crate) fn catalog_url(&self, account: &str, segments: &[&str]) -> Result<Url> {
        let base = match &self.options.catalog_url {
            Some(url) => url.clone(),
            None => format!("https://{}.{}", account, self.options.catalog_dns_suffix),
        };
        build_url(&base, segments, &self.options.catalog_api_version)
    }

    /// Send one request and collect its response
    ///
    /// Non-success statuses become `RemoteError::from_response`; failures
    /// before a response arrives become `RemoteError::Transport`.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<RawResponse> {
        let mut builder = builder
            .header(CLIENT_REQUEST_ID, Uuid::new_v4().to_string())
            .header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        let request = builder.build().map_err(ClientError::Request)?;

        if self.trace.is_active() {
            self.trace.send_request(Some(&traced_request(&request)));
        }
        debug!(method = %request.method(), url = %request.url(), "sending request");

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                self.trace.information(format!("request failed: {}", err));
                return Err(RemoteError::transport(err.to_string()).into());
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::transport(format!("failed to read response body: {}", e)))?;

        if self.trace.is_active() {
            self.trace
                .receive_response(Some(&traced_response(status, &headers, &body)));
        }
        debug!(status = status.as_u16(), bytes = body.len(), "received response");

        if !status.is_success() {
            return Err(RemoteError::from_response(status.as_u16(), &body).into());
        }

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    /// Follow an `Azure-AsyncOperation` header until the operation ends
    ///
    /// Returns `Ok(false)` when `initial` did not start a long-running
    /// operation. A `Failed` or `Canceled` terminal status becomes a
    /// structured remote error carrying the operation's error code.
    pub(crate) async fn await_completion(&self, initial: &RawResponse) -> Result<bool> {
        let Some(status_url) = initial.header(ASYNC_OPERATION) else {
            return Ok(false);
        };
        let status_url =
            Url::parse(status_url).map_err(|e| ClientError::invalid_url(status_url, e))?;
        let deadline = tokio::time::Instant::now() + self.options.timeout;

        loop {
            let raw = self.send(self.http.get(status_url.clone())).await?;
            let operation: LongRunningOperationError =
                serde_json::from_str(&raw.body).map_err(|source| ClientError::Decode {
                    what: "operation status",
                    source,
                })?;

            match operation.status {
                OperationStatus::Succeeded => return Ok(true),
                OperationStatus::Failed | OperationStatus::Canceled => {
                    return Err(RemoteError::Structured {
                        http_status: Some(raw.status.as_u16()),
                        error: operation.into(),
                    }
                    .into());
                }
                OperationStatus::InProgress | OperationStatus::Unknown => {
                    debug!(url = %status_url, "operation in progress");
                }
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(ClientError::PollTimeout(self.options.timeout));
            }
            tokio::time::sleep(self.options.poll_interval).await;
        }
    }
}

/// A successful HTTP response with its body read
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn decode<T: DeserializeOwned>(&self, what: &'static str) -> Result<OperationResponse<T>> {
        let body = serde_json::from_str(&self.body)
            .map_err(|source| ClientError::Decode { what, source })?;

        Ok(OperationResponse {
            request_id: self.header(REQUEST_ID).map(String::from),
            status_code: self.status.as_u16(),
            body,
        })
    }
}

fn build_url(base: &str, segments: &[&str], api_version: &str) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|e| ClientError::invalid_url(base, e))?;
    url.path_segments_mut()
        .map_err(|_| {
            ClientError::invalid_url(base, url::ParseError::RelativeUrlWithCannotBeABaseBase)
        })?
        .pop_if_empty()
        .extend(segments);
    url.query_pairs_mut().append_pair("api-version", api_version);
    Ok(url)
}

fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or("<binary>").to_string(),
            )
        })
        .collect()
}

fn traced_request(request: &reqwest::Request) -> TracedRequest {
    TracedRequest {
        method: request.method().to_string(),
        uri: request.url().to_string(),
        headers: header_pairs(request.headers()),
        body: request
            .body()
            .and_then(|b| b.as_bytes())
            .map(|b| String::from_utf8_lossy(b).into_owned()),
    }
}

fn traced_response(status: StatusCode, headers: &HeaderMap, body: &str) -> TracedResponse {
    TracedResponse {
        status: status.as_u16(),
        reason: status.canonical_reason().map(String::from),
        headers: header_pairs(headers),
        body: (!body.is_empty()).then(|| body.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(options: ClientOptions) -> ManagementClient {
        ManagementClient::new(options).unwrap()
    }

    #[test]
    fn test_management_url_encodes_segments() {
        let client = client(ClientOptions::default());
        let url = client
            .management_url(&["subscriptions", "sub", "resourceGroups", "my rg"], "2016-03-30")
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://management.azure.com/subscriptions/sub/resourceGroups/my%20rg?api-version=2016-03-30"
        );
    }

    #[test]
    fn test_catalog_url_uses_account_host() {
        let client = client(ClientOptions::default());
        let url = client
            .catalog_url("contosoadla", &["catalog", "usql", "databases", "master"])
            .unwrap();

        assert_eq!(url.host_str(), Some("contosoadla.azuredatalakeanalytics.net"));
        assert!(url.path().ends_with("/catalog/usql/databases/master"));
        assert_eq!(url.query(), Some("api-version=2015-10-01-preview"));
    }

    #[test]
    fn test_catalog_url_override() {
        let client = client(ClientOptions {
            catalog_url: Some("http://127.0.0.1:8080/".to_string()),
            ..ClientOptions::default()
        });
        let url = client.catalog_url("ignored", &["catalog"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/catalog?api-version=2015-10-01-preview"
        );
    }

    #[test]
    fn test_missing_subscription() {
        let client = client(ClientOptions::default());
        assert!(matches!(
            client.subscription_id(),
            Err(ClientError::MissingSubscription)
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        let client = client(ClientOptions {
            resource_manager_url: "not a url".to_string(),
            ..ClientOptions::default()
        });
        assert!(matches!(
            client.management_url(&["x"], "v"),
            Err(ClientError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_options_from_config() {
        let mut config = RuntimeConfig::default();
        config.network.http_timeout_secs = 12;
        config.network.poll_interval_ms = 0;

        let options = ClientOptions::from_config(&config);
        assert_eq!(options.timeout, Duration::from_secs(12));
        assert_eq!(options.poll_interval, Duration::ZERO);
    }
}
