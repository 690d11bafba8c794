//! Platform-agnostic application bootstrap for Ubikial.
//!
//! Provides `AppConfig` (file + environment configuration), `AppState`
//! (injected storage and repository host), `AppStateBuilder` (adapter
//! injection) and `UserSession` (the services of one opened user session).

pub mod adapters;
pub mod config;

use std::sync::Arc;

use ubikial_core::error::{CoreError, CoreResult};
use ubikial_core::services::{CredentialVault, PersonaService, SessionContext};
use ubikial_core::storage::{BackendKind, PersonaBackend};
use ubikial_core::traits::KeyValueStore;
use ubikial_core::types::SyncReport;
use ubikial_github::{GitHubClient, RepositoryHost};

use adapters::FileKeyValueStore;
pub use config::{AppConfig, GitHubSettings, StoreKind};

/// Platform-agnostic application state.
///
/// Holds the injected adapters. Every frontend constructs this once at
/// startup via `AppStateBuilder` (or [`AppState::from_config`]) and opens one
/// [`UserSession`] per user.
pub struct AppState {
    kv_store: Arc<dyn KeyValueStore>,
    repository_host: Option<Arc<dyn RepositoryHost>>,
    online: bool,
    vault_passphrase: Option<String>,
}

impl AppState {
    /// Build the state described by a configuration.
    ///
    /// Opens the configured key/value store under the data directory and,
    /// when a token is configured, a GitHub client.
    pub async fn from_config(config: &AppConfig) -> CoreResult<Self> {
        let data_dir = config.data_dir();
        let kv_store: Arc<dyn KeyValueStore> = match config.store {
            StoreKind::File => Arc::new(FileKeyValueStore::open(data_dir.join("store.json")).await?),
            #[cfg(feature = "sqlite-store")]
            StoreKind::Sqlite => Arc::new(
                adapters::SqliteKeyValueStore::new(&data_dir.join("store.db")).await?,
            ),
            #[cfg(not(feature = "sqlite-store"))]
            StoreKind::Sqlite => {
                return Err(CoreError::ValidationError(
                    "SQLite storage requires the 'sqlite-store' feature".to_string(),
                ));
            }
        };

        let mut builder = AppStateBuilder::new()
            .key_value_store(kv_store)
            .online(!config.offline);
        if let Some(token) = config.github.token.clone() {
            let client = GitHubClient::new(token, config.github.client.clone())?;
            builder = builder.repository_host(Arc::new(client));
        }
        if let Some(passphrase) = config.vault_passphrase.clone() {
            builder = builder.vault_passphrase(passphrase);
        }
        builder.build()
    }

    /// Whether a repository host is configured.
    #[must_use]
    pub fn has_repository_host(&self) -> bool {
        self.repository_host.is_some()
    }

    /// Open a session for `user_id` and select its persona backend.
    pub async fn open_session(&self, user_id: &str) -> CoreResult<UserSession> {
        let session = SessionContext::open(user_id, Arc::clone(&self.kv_store))?;
        let backend = Arc::new(
            PersonaBackend::select(
                Arc::clone(&session),
                self.online,
                self.repository_host.clone(),
            )
            .await,
        );
        let persona_service = PersonaService::new(backend.clone());
        let vault = self
            .vault_passphrase
            .as_deref()
            .map(|p| CredentialVault::new(Arc::clone(&session), p))
            .transpose()?;

        log::info!(
            "Session opened for {} ({} storage)",
            session.user_id(),
            backend.kind()
        );
        Ok(UserSession {
            session,
            backend,
            persona_service,
            vault,
        })
    }
}

/// Services of one opened user session.
pub struct UserSession {
    session: Arc<SessionContext>,
    backend: Arc<PersonaBackend>,
    /// Persona service over the selected backend
    pub persona_service: PersonaService,
    vault: Option<CredentialVault>,
}

impl UserSession {
    #[must_use]
    pub fn user_id(&self) -> &str {
        self.session.user_id()
    }

    /// Kind of the selected persona backend.
    #[must_use]
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Reconcile local and remote personas.
    pub async fn sync(&self) -> CoreResult<SyncReport> {
        self.backend.sync().await
    }

    /// The credential vault; requires a configured passphrase.
    pub fn vault(&self) -> CoreResult<&CredentialVault> {
        self.vault.as_ref().ok_or_else(|| {
            CoreError::ValidationError(format!(
                "No vault passphrase configured (set {})",
                config::env_vars::VAULT_PASSPHRASE
            ))
        })
    }

    /// Flush storage and close the session.
    pub async fn close(self) -> CoreResult<()> {
        self.session.close().await
    }
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Required adapters
/// - `key_value_store` — where personas and the credential vault are stored
///
/// # Optional
/// - `repository_host` — remote persona storage; local only when absent
/// - `online` — defaults to `true`
/// - `vault_passphrase` — enables the credential vault
pub struct AppStateBuilder {
    kv_store: Option<Arc<dyn KeyValueStore>>,
    repository_host: Option<Arc<dyn RepositoryHost>>,
    online: bool,
    vault_passphrase: Option<String>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            kv_store: None,
            repository_host: None,
            online: true,
            vault_passphrase: None,
        }
    }

    #[must_use]
    pub fn key_value_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.kv_store = Some(store);
        self
    }

    #[must_use]
    pub fn repository_host(mut self, host: Arc<dyn RepositoryHost>) -> Self {
        self.repository_host = Some(host);
        self
    }

    #[must_use]
    pub fn online(mut self, online: bool) -> Self {
        self.online = online;
        self
    }

    #[must_use]
    pub fn vault_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.vault_passphrase = Some(passphrase.into());
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` if required adapters are missing.
    pub fn build(self) -> CoreResult<AppState> {
        let kv_store = self.kv_store.ok_or_else(|| {
            CoreError::ValidationError("key_value_store is required".to_string())
        })?;
        if self.vault_passphrase.as_deref() == Some("") {
            return Err(CoreError::ValidationError(
                "vault_passphrase must not be empty".to_string(),
            ));
        }

        Ok(AppState {
            kv_store,
            repository_host: self.repository_host,
            online: self.online,
            vault_passphrase: self.vault_passphrase,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
