//! Generic HTTP request helpers
//!
//! Shared request plumbing for host clients: sending, logging, reading the
//! body and classifying transport failures. Status interpretation stays with
//! each host, which knows its own error body format.
//!
//! Requests are sent exactly once. Persona storage either degrades to the
//! local store or surfaces the failure to the caller, so a retry loop here
//! would only delay that decision.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::error::RemoteError;
use crate::utils::log_sanitizer::truncate_for_log;

/// HTTP helper function set
pub(crate) struct HttpUtils;

impl HttpUtils {
    /// Performs an HTTP request and returns the status code and response text
    ///
    /// # Arguments
    /// * `request_builder` - fully configured request (URL, headers, body)
    /// * `host_name` - host id (for logging and errors)
    /// * `method_name` - HTTP method (for logging)
    /// * `path` - request path (for logging)
    ///
    /// # Returns
    /// * `Ok((status_code, response_text))` - the host answered, whatever the status
    /// * `Err(RemoteError::NetworkError | Timeout | RateLimited)` - transport failure or HTTP 429
    pub async fn execute_request(
        request_builder: RequestBuilder,
        host_name: &str,
        method_name: &str,
        path: &str,
    ) -> Result<(u16, String), RemoteError> {
        log::debug!("[{host_name}] {method_name} {path}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                RemoteError::Timeout {
                    host: host_name.to_string(),
                    detail: e.to_string(),
                }
            } else {
                RemoteError::NetworkError {
                    host: host_name.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("[{host_name}] Response Status: {status_code}");

        // Read Retry-After before the body consumes the response
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        if status_code == 429 {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{host_name}] Rate limited (HTTP 429), retry_after={retry_after:?}");
            return Err(RemoteError::RateLimited {
                host: host_name.to_string(),
                retry_after,
                raw_message: Some(body),
            });
        }

        if matches!(status_code, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{host_name}] Upstream unavailable (HTTP {status_code})");
            return Err(RemoteError::NetworkError {
                host: host_name.to_string(),
                detail: format!("HTTP {status_code}: {}", truncate_for_log(&body)),
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| RemoteError::NetworkError {
                host: host_name.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!(
            "[{host_name}] Response Body: {}",
            truncate_for_log(&response_text)
        );

        Ok((status_code, response_text))
    }

    /// Parse a JSON response body
    ///
    /// # Returns
    /// * `Err(RemoteError::ParseError)` - the body is not the expected shape
    pub fn parse_json<T>(response_text: &str, host_name: &str) -> Result<T, RemoteError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::error!("[{host_name}] JSON parse failed: {e}");
            log::error!(
                "[{host_name}] Raw response: {}",
                truncate_for_log(response_text)
            );
            RemoteError::ParseError {
                host: host_name.to_string(),
                detail: e.to_string(),
            }
        })
    }

    /// Serialize a request body
    pub fn to_json<T>(body: &T, host_name: &str) -> Result<String, RemoteError>
    where
        T: serde::Serialize,
    {
        serde_json::to_string(body).map_err(|e| RemoteError::SerializationError {
            host: host_name.to_string(),
            detail: e.to_string(),
        })
    }
}
