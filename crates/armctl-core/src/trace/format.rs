//! Human-readable rendering of HTTP requests and responses
//!
//! Output is deterministic: headers appear in the order given and JSON
//! bodies are pretty-printed with sorted keys. An absent request or
//! response renders as the empty string.

use serde::Serialize;

const SECTION_WIDTH: usize = 30;
const HEADER_KEY_WIDTH: usize = 30;
const REDACTED: &str = "[REDACTED]";

/// Snapshot of an outbound request, independent of the HTTP library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TracedRequest {
    pub method: String,
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl TracedRequest {
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Snapshot of an inbound response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TracedResponse {
    pub status: u16,
    pub reason: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl TracedResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Rendering options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Replace `Authorization` header values with a placeholder
    pub redact_authorization: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            redact_authorization: true,
        }
    }
}

/// Render a request with default options
pub fn format_request(request: Option<&TracedRequest>) -> String {
    format_request_with(request, &FormatOptions::default())
}

/// Render a response with default options
pub fn format_response(response: Option<&TracedResponse>) -> String {
    format_response_with(response, &FormatOptions::default())
}

pub fn format_request_with(request: Option<&TracedRequest>, options: &FormatOptions) -> String {
    let Some(request) = request else {
        return String::new();
    };

    let mut out = banner("HTTP REQUEST");
    section(&mut out, "HTTP Method", &request.method);
    section(&mut out, "Absolute Uri", &request.uri);
    section(&mut out, "Headers", &render_headers(&request.headers, options));
    section(&mut out, "Body", &render_body(request.body.as_deref()));
    out
}

pub fn format_response_with(response: Option<&TracedResponse>, options: &FormatOptions) -> String {
    let Some(response) = response else {
        return String::new();
    };

    let status = match &response.reason {
        Some(reason) => format!("{} {}", response.status, reason),
        None => response.status.to_string(),
    };

    let mut out = banner("HTTP RESPONSE");
    section(&mut out, "Status Code", &status);
    section(&mut out, "Headers", &render_headers(&response.headers, options));
    section(&mut out, "Body", &render_body(response.body.as_deref()));
    out
}

fn banner(title: &str) -> String {
    let rule = "=".repeat(SECTION_WIDTH);
    format!("{} {} {}\n\n", rule, title, rule)
}

fn section(out: &mut String, label: &str, content: &str) {
    out.push_str(label);
    out.push_str(":\n");
    out.push_str(content);
    out.push_str("\n\n");
}

fn render_headers(headers: &[(String, String)], options: &FormatOptions) -> String {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if options.redact_authorization && name.eq_ignore_ascii_case("authorization")
            {
                REDACTED
            } else {
                value.as_str()
            };
            format!("{:<width$}: {}", name, value, width = HEADER_KEY_WIDTH)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_body(body: Option<&str>) -> String {
    match body {
        None => String::new(),
        Some(text) => serde_json::from_str::<serde_json::Value>(text)
            .ok()
            .and_then(|value| serde_json::to_string_pretty(&value).ok())
            .unwrap_or_else(|| text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> TracedRequest {
        TracedRequest::new(
            "PUT",
            "https://management.azure.com/subscriptions/s/resourceGroups/rg/providers/Microsoft.Compute/virtualMachines/vm1/extensions/SqlIaasExtension?api-version=2016-03-30",
        )
        .with_header("Authorization", "Bearer secret-token")
        .with_header("x-ms-client-request-id", "7f1c")
        .with_body(r#"{"location":"westus","properties":{"type":"SqlIaaSAgent"}}"#)
    }

    #[test]
    fn test_absent_request_and_response_are_empty() {
        assert_eq!(format_request(None), "");
        assert_eq!(format_response(None), "");
    }

    #[test]
    fn test_request_sections() {
        let text = format_request(Some(&sample_request()));

        assert!(text.starts_with(&"=".repeat(SECTION_WIDTH)));
        assert!(text.contains("HTTP REQUEST"));
        assert!(text.contains("HTTP Method:\nPUT\n"));
        assert!(text.contains("Absolute Uri:\nhttps://management.azure.com/"));
        assert!(text.contains("x-ms-client-request-id"));
        assert!(text.contains("\"type\": \"SqlIaaSAgent\""));
    }

    #[test]
    fn test_authorization_is_redacted_by_default() {
        let text = format_request(Some(&sample_request()));
        assert!(!text.contains("secret-token"));
        assert!(text.contains(REDACTED));
    }

    #[test]
    fn test_authorization_kept_when_redaction_disabled() {
        let options = FormatOptions {
            redact_authorization: false,
        };
        let text = format_request_with(Some(&sample_request()), &options);
        assert!(text.contains("Bearer secret-token"));
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let request = sample_request();
        assert_eq!(
            format_request(Some(&request)),
            format_request(Some(&request))
        );
    }

    #[test]
    fn test_response_status_and_raw_body() {
        let response = TracedResponse::new(500)
            .with_reason("Internal Server Error")
            .with_header("x-ms-request-id", "abc")
            .with_body("upstream connect error");
        let text = format_response(Some(&response));

        assert!(text.contains("HTTP RESPONSE"));
        assert!(text.contains("Status Code:\n500 Internal Server Error\n"));
        assert!(text.contains("Body:\nupstream connect error\n"));
    }

    #[test]
    fn test_response_without_body() {
        let text = format_response(Some(&TracedResponse::new(204)));
        assert!(text.contains("Status Code:\n204\n"));
        assert!(text.ends_with("Body:\n\n\n"));
    }
}
