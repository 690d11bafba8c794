//! GitHub repository host

mod error;
mod host;
mod http;
mod types;

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{RemoteError, Result};
use crate::utils::log_sanitizer::mask_token;

/// Public GitHub REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
/// GitHub caps `per_page` at 100.
pub(crate) const MAX_PAGE_SIZE: u32 = 100;
/// REST API version pinned through `X-GitHub-Api-Version`.
pub(crate) const API_VERSION: &str = "2022-11-28";
pub(crate) const HOST_NAME: &str = "github";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`GitHubClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitHubConfig {
    /// REST base URL, without trailing slash. Override for GitHub Enterprise.
    pub api_base: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header; GitHub rejects requests without one.
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: concat!("ubikial/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// GitHub REST client implementing [`RepositoryHost`](crate::RepositoryHost).
pub struct GitHubClient {
    pub(crate) client: Client,
    pub(crate) api_base: String,
    pub(crate) token: String,
}

impl GitHubClient {
    /// Create a client for `token`.
    ///
    /// # Errors
    /// Returns `RemoteError::NetworkError` if the HTTP client cannot be built
    /// (e.g. the TLS backend fails to initialize).
    pub fn new(token: String, config: GitHubConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| RemoteError::NetworkError {
                host: HOST_NAME.to_string(),
                detail: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token,
        })
    }
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_base", &self.api_base)
            .field("token", &mask_token(&self.token))
            .finish_non_exhaustive()
    }
}
