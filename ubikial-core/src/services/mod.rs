//! Business logic service layer

mod credential_vault;
mod persona_service;
mod sync_service;

pub use credential_vault::CredentialVault;
pub use persona_service::PersonaService;
pub use sync_service::{SyncAction, SyncService};

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{CoreError, CoreResult};
use crate::traits::KeyValueStore;

/// Storage category of a per-user key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageScope {
    Personas,
    Credentials,
}

impl StorageScope {
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Personas => "personas",
            Self::Credentials => "credentials",
        }
    }
}

/// Session context - the per-user scope every store and service works in
///
/// Owns the injected key/value store and derives all storage keys from the
/// user id. Once [`close`](Self::close)d, every storage access fails with
/// [`CoreError::SessionClosed`].
pub struct SessionContext {
    user_id: String,
    store: Arc<dyn KeyValueStore>,
    closed: AtomicBool,
}

impl SessionContext {
    /// Open a session for `user_id`
    pub fn open(user_id: impl Into<String>, store: Arc<dyn KeyValueStore>) -> CoreResult<Arc<Self>> {
        let user_id = user_id.into().trim().to_string();
        if user_id.is_empty() {
            return Err(CoreError::ValidationError(
                "User id must not be empty".to_string(),
            ));
        }
        if user_id.chars().any(char::is_whitespace) {
            return Err(CoreError::ValidationError(format!(
                "User id must not contain whitespace: '{user_id}'"
            )));
        }
        log::debug!("Opened session for user {user_id}");
        Ok(Arc::new(Self {
            user_id,
            store,
            closed: AtomicBool::new(false),
        }))
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Storage key of a scope, e.g. `personas_<userId>`.
    #[must_use]
    pub fn key(&self, scope: StorageScope) -> String {
        format!("{}_{}", scope.prefix(), self.user_id)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Fail with `SessionClosed` once the session has been closed.
    pub fn ensure_open(&self) -> CoreResult<()> {
        if self.is_closed() {
            Err(CoreError::SessionClosed)
        } else {
            Ok(())
        }
    }

    /// Read and deserialize the document of a scope.
    pub async fn read_json<T: DeserializeOwned>(&self, scope: StorageScope) -> CoreResult<Option<T>> {
        self.ensure_open()?;
        let key = self.key(scope);
        match self.store.get(&key).await? {
            Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|e| {
                CoreError::SerializationError(format!("Corrupted data under '{key}': {e}"))
            }),
            None => Ok(None),
        }
    }

    /// Serialize and write the document of a scope.
    pub async fn write_json<T: Serialize + ?Sized>(&self, scope: StorageScope, value: &T) -> CoreResult<()> {
        self.ensure_open()?;
        let raw = serde_json::to_string(value)?;
        self.store.set(&self.key(scope), raw).await
    }

    /// Remove the document of a scope.
    pub async fn remove(&self, scope: StorageScope) -> CoreResult<()> {
        self.ensure_open()?;
        self.store.remove(&self.key(scope)).await
    }

    /// Flush the store and close the session.
    ///
    /// Closing an already closed session is a no-op. The session stays open
    /// if the flush fails so the caller can retry.
    pub async fn close(&self) -> CoreResult<()> {
        if self.is_closed() {
            return Ok(());
        }
        self.store.flush().await?;
        self.closed.store(true, Ordering::Release);
        log::debug!("Closed session for user {}", self.user_id);
        Ok(())
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("user_id", &self.user_id)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
