use async_trait::async_trait;

use crate::error::Result;
use crate::types::{FileWrite, RemoteFile, RemoteRepository, RemoteUser, RepositoryDraft, RepositoryRef};

/// A remote host storing records as repositories.
///
/// Implementations must not retry: callers decide whether a failure is fatal
/// (sync) or degrades to local storage (CRUD fallbacks).
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Host identifier, used as the `host` field of errors and in logs.
    fn id(&self) -> &'static str;

    /// Verify the credential and return the account it belongs to.
    async fn authenticate(&self) -> Result<RemoteUser>;

    /// List repositories owned by the authenticated user whose name starts with `prefix`.
    async fn list_repositories(&self, prefix: &str) -> Result<Vec<RemoteRepository>>;

    /// Create a repository owned by the authenticated user.
    async fn create_repository(&self, draft: &RepositoryDraft) -> Result<RemoteRepository>;

    /// Delete a repository.
    async fn delete_repository(&self, repo: &RepositoryRef) -> Result<()>;

    /// Read a file from the default branch.
    ///
    /// # Returns
    /// * `Ok(None)` - the repository exists but the file does not
    async fn get_file(&self, repo: &RepositoryRef, path: &str) -> Result<Option<RemoteFile>>;

    /// Create or overwrite a file on the default branch.
    async fn put_file(&self, repo: &RepositoryRef, write: &FileWrite) -> Result<RemoteFile>;
}
