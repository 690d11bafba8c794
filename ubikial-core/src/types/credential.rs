//! Linked platform account types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ubikial_github::utils::log_sanitizer::mask_token;

use super::Platform;

/// A platform account linked to the user, with its OAuth tokens.
///
/// Only ever persisted inside the encrypted vault envelope.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedAccount {
    pub platform: Platform,
    /// Account handle on the platform (e.g. `@rustlang`)
    pub handle: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, with = "crate::utils::datetime::option")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(with = "crate::utils::datetime")]
    pub linked_at: DateTime<Utc>,
}

impl LinkedAccount {
    /// Whether the access token has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Token-free view of this account.
    #[must_use]
    pub fn summary(&self, now: DateTime<Utc>) -> LinkedAccountSummary {
        LinkedAccountSummary {
            platform: self.platform,
            handle: self.handle.clone(),
            expires_at: self.expires_at,
            linked_at: self.linked_at,
            expired: self.is_expired_at(now),
        }
    }
}

impl fmt::Debug for LinkedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedAccount")
            .field("platform", &self.platform)
            .field("handle", &self.handle)
            .field("access_token", &mask_token(&self.access_token))
            .field(
                "refresh_token",
                &self.refresh_token.as_deref().map(mask_token),
            )
            .field("expires_at", &self.expires_at)
            .field("linked_at", &self.linked_at)
            .finish()
    }
}

/// Linked account without its tokens, safe to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedAccountSummary {
    pub platform: Platform,
    pub handle: String,
    #[serde(with = "crate::utils::datetime::option")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(with = "crate::utils::datetime")]
    pub linked_at: DateTime<Utc>,
    pub expired: bool,
}

/// Link account request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkAccountRequest {
    pub platform: Platform,
    pub handle: String,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds from now.
    #[serde(default)]
    pub expires_in: Option<i64>,
}
