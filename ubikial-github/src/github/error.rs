//! GitHub status mapping
//!
//! Reference: <https://docs.github.com/en/rest/using-the-rest-api/troubleshooting-the-rest-api>

use crate::error::RemoteError;

use super::HOST_NAME;
use super::types::GhErrorBody;

/// Map a non-success status and its body to a [`RemoteError`].
pub(crate) fn map_status(status: u16, body: &str, resource: &str) -> RemoteError {
    let message = serde_json::from_str::<GhErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string());
    let host = HOST_NAME.to_string();

    match status {
        // Bad credentials / expired token
        401 => RemoteError::Unauthorized {
            host,
            raw_message: Some(message),
        },
        // Primary and secondary rate limits are reported as 403 with a message
        403 if message.to_lowercase().contains("rate limit") => RemoteError::RateLimited {
            host,
            retry_after: None,
            raw_message: Some(message),
        },
        403 => RemoteError::PermissionDenied {
            host,
            raw_message: Some(message),
        },
        404 => RemoteError::NotFound {
            host,
            resource: resource.to_string(),
        },
        // 409: sha mismatch on contents write; 422: repository name already taken
        409 | 422 => RemoteError::Conflict {
            host,
            resource: resource.to_string(),
            raw_message: Some(message),
        },
        _ => RemoteError::Api {
            host,
            status,
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized() {
        let e = map_status(401, r#"{"message":"Bad credentials"}"#, "/user");
        assert_eq!(
            e,
            RemoteError::Unauthorized {
                host: "github".to_string(),
                raw_message: Some("Bad credentials".to_string()),
            }
        );
    }

    #[test]
    fn forbidden_rate_limit() {
        let e = map_status(
            403,
            r#"{"message":"API rate limit exceeded for user ID 1."}"#,
            "/user/repos",
        );
        assert!(matches!(e, RemoteError::RateLimited { .. }));
    }

    #[test]
    fn forbidden_permission() {
        let e = map_status(403, r#"{"message":"Resource not accessible"}"#, "o/r");
        assert!(matches!(e, RemoteError::PermissionDenied { .. }));
    }

    #[test]
    fn not_found_keeps_resource() {
        let e = map_status(404, r#"{"message":"Not Found"}"#, "octocat/ubikial-persona-1");
        assert_eq!(
            e,
            RemoteError::NotFound {
                host: "github".to_string(),
                resource: "octocat/ubikial-persona-1".to_string(),
            }
        );
    }

    #[test]
    fn name_taken_is_conflict() {
        let e = map_status(
            422,
            r#"{"message":"Repository creation failed."}"#,
            "ubikial-persona-1",
        );
        assert!(matches!(e, RemoteError::Conflict { .. }));
    }

    #[test]
    fn other_status_is_api_error() {
        let e = map_status(500, "oops", "/user");
        assert_eq!(
            e,
            RemoteError::Api {
                host: "github".to_string(),
                status: 500,
                message: "oops".to_string(),
            }
        );
    }
}
