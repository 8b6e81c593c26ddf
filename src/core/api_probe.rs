//! One-shot probe of a back-office REST endpoint

use crate::adapters::api::{ApiClient, ApiResponse};
use crate::domain::{Result, WaypointError};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiProbeReport {
    pub response: ApiResponse,
}

impl fmt::Display for ApiProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.response;
        let marker = if r.is_success() { "✅" } else { "⚠️ " };
        writeln!(f, "{marker} {} {} -> {}", r.method, r.url, r.status)?;
        let body = serde_json::to_string_pretty(&r.body).unwrap_or_else(|_| r.body.to_string());
        write!(f, "{body}")
    }
}

/// Parse a `--body` argument
///
/// # Errors
///
/// Returns a validation error when the text is not JSON.
pub fn parse_request_body(raw: &str) -> Result<Value> {
    serde_json::from_str(raw)
        .map_err(|e| WaypointError::Validation(format!("Request body is not valid JSON: {e}")))
}

/// Call `{base_url}{path}` once and report status and body
///
/// Non-2xx responses are reported, not returned as errors.
pub async fn probe_api(
    client: &ApiClient,
    method: &str,
    path: &str,
    body: Option<&Value>,
) -> Result<ApiProbeReport> {
    let response = client.request(method, path, body).await?;
    if !response.is_success() {
        tracing::warn!(
            status = response.status,
            url = %response.url,
            body = %response.body,
            "API returned an error response"
        );
    }
    Ok(ApiProbeReport { response })
}
