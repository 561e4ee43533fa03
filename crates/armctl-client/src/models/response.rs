use serde::Serialize;

/// Projection of a completed management call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse<T> {
    /// Service request id (`x-ms-request-id`)
    pub request_id: Option<String>,
    pub status_code: u16,
    pub body: T,
}
