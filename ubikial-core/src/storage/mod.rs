//! Persona storage backends and backend selection

mod github;
mod local;

pub use github::{GitHubPersonaStore, METADATA_FILE, REPOSITORY_PREFIX, RemotePersona};
pub use local::LocalPersonaStore;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use ubikial_github::RepositoryHost;

use crate::error::{CoreError, CoreResult};
use crate::services::{SessionContext, SyncService};
use crate::traits::PersonaStore;
use crate::types::{Persona, SyncReport};

/// Discriminant of [`PersonaBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Local,
    GitHub,
}

impl BackendKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::GitHub => "github",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The persona store selected for a session.
pub enum PersonaBackend {
    Local(LocalPersonaStore),
    GitHub(GitHubPersonaStore),
}

impl PersonaBackend {
    /// Choose a backend for the session.
    ///
    /// The repository-backed store is used only when the session is online,
    /// a host is configured and the host accepts its credential; otherwise
    /// the local store.
    pub async fn select(
        session: Arc<SessionContext>,
        online: bool,
        host: Option<Arc<dyn RepositoryHost>>,
    ) -> Self {
        let local = LocalPersonaStore::new(session);
        let Some(host) = host.filter(|_| online) else {
            log::info!(
                "Using local persona storage ({})",
                if online { "no repository host configured" } else { "offline" }
            );
            return Self::Local(local);
        };

        let store = GitHubPersonaStore::new(host, local.clone());
        if store.is_available().await {
            log::info!("Using {} persona storage", store.host_id());
            Self::GitHub(store)
        } else {
            log::warn!(
                "Repository host {} rejected the credential or is unreachable, using local persona storage",
                store.host_id()
            );
            Self::Local(local)
        }
    }

    #[must_use]
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Local(_) => BackendKind::Local,
            Self::GitHub(_) => BackendKind::GitHub,
        }
    }

    /// The local store (the mirror, for the repository-backed variant).
    #[must_use]
    pub fn local(&self) -> &LocalPersonaStore {
        match self {
            Self::Local(store) => store,
            Self::GitHub(store) => store.local(),
        }
    }

    fn store(&self) -> &dyn PersonaStore {
        match self {
            Self::Local(store) => store,
            Self::GitHub(store) => store,
        }
    }

    /// Reconcile local and remote collections.
    ///
    /// Only the repository-backed variant can sync.
    pub async fn sync(&self) -> CoreResult<SyncReport> {
        match self {
            Self::GitHub(store) => SyncService::new(store).reconcile().await,
            Self::Local(_) => Err(CoreError::BackendUnsupported {
                backend: BackendKind::Local.to_string(),
                operation: "sync".to_string(),
            }),
        }
    }
}

#[async_trait]
impl PersonaStore for PersonaBackend {
    async fn save(&self, persona: Persona) -> CoreResult<Persona> {
        self.store().save(persona).await
    }

    async fn update(&self, persona: Persona) -> CoreResult<Persona> {
        self.store().update(persona).await
    }

    async fn delete(&self, id: &str) -> CoreResult<()> {
        self.store().delete(id).await
    }

    async fn list(&self) -> CoreResult<Vec<Persona>> {
        self.store().list().await
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Persona>> {
        self.store().find_by_id(id).await
    }

    async fn is_available(&self) -> bool {
        self.store().is_available().await
    }
}
