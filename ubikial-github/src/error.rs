use serde::{Deserialize, Serialize};

/// Unified error type for all repository host operations.
///
/// Each variant carries a `host` field identifying which host produced the
/// error, plus variant-specific context. All variants are serializable for
/// structured error reporting.
///
/// The taxonomy is intentionally small: authentication failures
/// ([`Unauthorized`](Self::Unauthorized)), request failures with an HTTP
/// status ([`Api`](Self::Api) and the status-specific variants), and
/// transport or decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum RemoteError {
    /// A network-level error occurred (DNS resolution failure, connection refused, etc.).
    NetworkError {
        /// Host that produced the error.
        host: String,
        /// Error details.
        detail: String,
    },

    /// The host rejected the credential (HTTP 401).
    Unauthorized {
        /// Host that produced the error.
        host: String,
        /// Original error message from the host API, if available.
        raw_message: Option<String>,
    },

    /// The credential is valid but lacks access to the resource (HTTP 403).
    PermissionDenied {
        /// Host that produced the error.
        host: String,
        /// Original error message from the host API, if available.
        raw_message: Option<String>,
    },

    /// The repository or file does not exist (HTTP 404).
    NotFound {
        /// Host that produced the error.
        host: String,
        /// Repository or path that was not found.
        resource: String,
    },

    /// The resource already exists or the write raced another one (HTTP 409/422).
    Conflict {
        /// Host that produced the error.
        host: String,
        /// Repository or path involved in the conflict.
        resource: String,
        /// Original error message from the host API, if available.
        raw_message: Option<String>,
    },

    /// The API rate limit has been exceeded.
    RateLimited {
        /// Host that produced the error.
        host: String,
        /// Suggested wait time in seconds, if provided by the API.
        retry_after: Option<u64>,
        /// Original error message from the host API, if available.
        raw_message: Option<String>,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Host that produced the error.
        host: String,
        /// Error details.
        detail: String,
    },

    /// Any other non-success HTTP status.
    Api {
        /// Host that produced the error.
        host: String,
        /// HTTP status code.
        status: u16,
        /// Error message from the host API.
        message: String,
    },

    /// Failed to parse the host's API response.
    ParseError {
        /// Host that produced the error.
        host: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to build a request body.
    SerializationError {
        /// Host that produced the error.
        host: String,
        /// Details about the serialization failure.
        detail: String,
    },
}

impl RemoteError {
    /// Whether this is expected behavior (bad credential, missing resource, etc.), used for log levels.
    ///
    /// Use `warn` when this returns `true`, `error` otherwise.
    /// **Keep this in sync when adding variants.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. }
                | Self::PermissionDenied { .. }
                | Self::NotFound { .. }
                | Self::Conflict { .. }
        )
    }

    /// Whether the host rejected the credential.
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// HTTP status associated with the error, when the host answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::PermissionDenied { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::RateLimited { .. } => Some(429),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { host, detail } => {
                write!(f, "[{host}] Network error: {detail}")
            }
            Self::Unauthorized { host, raw_message } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{host}] Authentication failed: {msg}")
                } else {
                    write!(f, "[{host}] Authentication failed")
                }
            }
            Self::PermissionDenied { host, raw_message } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{host}] Permission denied: {msg}")
                } else {
                    write!(f, "[{host}] Permission denied")
                }
            }
            Self::NotFound { host, resource } => {
                write!(f, "[{host}] '{resource}' not found")
            }
            Self::Conflict {
                host,
                resource,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{host}] Conflict on '{resource}': {msg}")
                } else {
                    write!(f, "[{host}] Conflict on '{resource}'")
                }
            }
            Self::RateLimited {
                host, retry_after, ..
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{host}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{host}] Rate limited")
                }
            }
            Self::Timeout { host, detail } => {
                write!(f, "[{host}] Request timeout: {detail}")
            }
            Self::Api {
                host,
                status,
                message,
            } => {
                write!(f, "[{host}] API error (HTTP {status}): {message}")
            }
            Self::ParseError { host, detail } => {
                write!(f, "[{host}] Parse error: {detail}")
            }
            Self::SerializationError { host, detail } => {
                write!(f, "[{host}] Serialization error: {detail}")
            }
        }
    }
}

impl std::error::Error for RemoteError {}

/// Convenience type alias for `Result<T, RemoteError>`.
pub type Result<T> = std::result::Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_network_error() {
        let e = RemoteError::NetworkError {
            host: "github".to_string(),
            detail: "connection refused".to_string(),
        };
        assert_eq!(e.to_string(), "[github] Network error: connection refused");
    }

    #[test]
    fn display_unauthorized_with_message() {
        let e = RemoteError::Unauthorized {
            host: "github".to_string(),
            raw_message: Some("Bad credentials".to_string()),
        };
        assert_eq!(
            e.to_string(),
            "[github] Authentication failed: Bad credentials"
        );
    }

    #[test]
    fn display_api_error_includes_status() {
        let e = RemoteError::Api {
            host: "github".to_string(),
            status: 500,
            message: "Server Error".to_string(),
        };
        assert_eq!(e.to_string(), "[github] API error (HTTP 500): Server Error");
    }

    #[test]
    fn display_rate_limited_with_retry_after() {
        let e = RemoteError::RateLimited {
            host: "github".to_string(),
            retry_after: Some(60),
            raw_message: None,
        };
        assert_eq!(e.to_string(), "[github] Rate limited (retry after 60s)");
    }

    #[test]
    fn expected_errors() {
        let not_found = RemoteError::NotFound {
            host: "github".to_string(),
            resource: "octo/repo".to_string(),
        };
        assert!(not_found.is_expected());

        let timeout = RemoteError::Timeout {
            host: "github".to_string(),
            detail: "30s".to_string(),
        };
        assert!(!timeout.is_expected());
    }

    #[test]
    fn status_codes() {
        let unauthorized = RemoteError::Unauthorized {
            host: "github".to_string(),
            raw_message: None,
        };
        assert!(unauthorized.is_auth_error());
        assert_eq!(unauthorized.status(), Some(401));

        let network = RemoteError::NetworkError {
            host: "github".to_string(),
            detail: "reset".to_string(),
        };
        assert_eq!(network.status(), None);
    }

    #[test]
    fn serializes_with_code_tag() {
        let e = RemoteError::Api {
            host: "github".to_string(),
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["code"], "Api");
        assert_eq!(json["status"], 502);
    }
}
