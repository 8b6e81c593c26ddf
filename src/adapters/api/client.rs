//! HTTP client for the back-office REST API

use crate::config::ApiConfig;
use crate::domain::{ApiError, Result, WaypointError};
use reqwest::{Client, ClientBuilder, Method};
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

/// Outcome of one API call
///
/// Any HTTP status is a valid response; only transport failures are errors.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Client for `{api.base_url}{path}` requests
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ApiClient {
    /// Build a client from `[api]`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the base URL does not parse.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| {
            WaypointError::Api(ApiError::InvalidUrl(format!("{base_url}: {e}")))
        })?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(10)))
            .build()
            .map_err(|e| WaypointError::Api(ApiError::ConnectionFailed(e.to_string())))?;

        Ok(Self {
            client,
            base_url,
            auth_token: config
                .auth_token
                .as_ref()
                .map(|token| token.expose_secret().as_str().to_string()),
        })
    }

    /// Replace the configured bearer token for this client
    pub fn with_token(mut self, token: Option<String>) -> Self {
        if token.is_some() {
            self.auth_token = token;
        }
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path
    pub fn url_for(&self, path: &str) -> Result<Url> {
        let joined = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        Url::parse(&joined)
            .map_err(|e| WaypointError::Api(ApiError::InvalidUrl(format!("{joined}: {e}"))))
    }

    /// Send one request and capture status and body
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown method, `ApiError::Timeout`
    /// when the request times out, and `ApiError::ConnectionFailed` when the
    /// server cannot be reached.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let method = Method::from_bytes(method.trim().to_uppercase().as_bytes())
            .map_err(|_| WaypointError::Validation(format!("Invalid HTTP method: {method}")))?;
        let url = self.url_for(path)?;

        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(method = %method, url = %url, "Sending API request");

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                WaypointError::Api(ApiError::Timeout(e.to_string()))
            } else {
                WaypointError::Api(ApiError::ConnectionFailed(e.to_string()))
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                WaypointError::Api(ApiError::Timeout(e.to_string()))
            } else {
                WaypointError::Api(ApiError::ConnectionFailed(e.to_string()))
            }
        })?;

        let body = parse_body(status.as_u16(), status.is_success(), &text);

        tracing::info!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            "API request completed"
        );

        Ok(ApiResponse {
            method: method.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

/// Parse a response body without failing
///
/// Unparseable error bodies become
/// `{"error": "Unknown error", "status": <code>, "raw": <text>}`. A successful
/// non-JSON body is kept as a string.
pub fn parse_body(status: u16, success: bool, text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(_) if success && text.trim().is_empty() => Value::Null,
        Err(_) if success => Value::String(text.to_string()),
        Err(_) => json!({
            "error": "Unknown error",
            "status": status,
            "raw": text,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn test_url_for_joins_with_single_slash() {
        let client = ApiClient::new(&api_config("http://localhost:3000/")).unwrap();
        assert_eq!(
            client.url_for("/api/quotes").unwrap().as_str(),
            "http://localhost:3000/api/quotes"
        );
        assert_eq!(
            client.url_for("api/quotes").unwrap().as_str(),
            "http://localhost:3000/api/quotes"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ApiClient::new(&api_config("not a url")).unwrap_err();
        assert!(matches!(err, WaypointError::Api(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn test_parse_body_fallbacks() {
        assert_eq!(parse_body(200, true, r#"{"ok":true}"#), json!({"ok": true}));
        assert_eq!(parse_body(204, true, ""), Value::Null);
        assert_eq!(parse_body(200, true, "pong"), json!("pong"));
        assert_eq!(
            parse_body(502, false, "<html>Bad Gateway</html>"),
            json!({"error": "Unknown error", "status": 502, "raw": "<html>Bad Gateway</html>"})
        );
        assert_eq!(
            parse_body(500, false, ""),
            json!({"error": "Unknown error", "status": 500, "raw": ""})
        );
    }

    #[test]
    fn test_json_error_body_kept() {
        assert_eq!(
            parse_body(404, false, r#"{"error":"Quote not found"}"#),
            json!({"error": "Quote not found"})
        );
    }
}
