//! # ubikial-github
//!
//! Repository host abstraction used by Ubikial to mirror personas into
//! remote repositories, one repository per persona.
//!
//! ## Hosts
//!
//! | Host | Type | Auth Method |
//! |------|------|-------------|
//! | [GitHub](https://github.com/) | [`GitHubClient`] | Bearer token (classic or fine-grained PAT, OAuth token) |
//!
//! ## Feature Flags
//!
//! - **`native-tls`** *(default)*: use the platform's native TLS implementation.
//! - **`rustls`**: use rustls. Recommended for cross-compilation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ubikial_github::{GitHubClient, GitHubConfig, RepositoryHost};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let host = GitHubClient::new("ghp_your_token".to_string(), GitHubConfig::default())?;
//!
//!     let user = host.authenticate().await?;
//!     println!("authenticated as {}", user.login);
//!
//!     for repo in host.list_repositories("ubikial-persona-").await? {
//!         println!("{}", repo.full_name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every host operation returns [`RemoteError`]. Authentication failures map
//! to [`RemoteError::Unauthorized`], non-success statuses without a dedicated
//! variant map to [`RemoteError::Api`] carrying the HTTP status.

mod error;
mod github;
mod http_client;
mod traits;
mod types;
pub mod utils;

pub use error::{RemoteError, Result};
pub use github::{GitHubClient, GitHubConfig, DEFAULT_API_BASE};
pub use traits::RepositoryHost;
pub use types::{FileWrite, RemoteFile, RemoteRepository, RemoteUser, RepositoryDraft, RepositoryRef};
