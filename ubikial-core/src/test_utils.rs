//! Test helpers
//!
//! In-memory mocks and factory functions.

#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::DateTime;
use tokio::sync::RwLock;
use ubikial_github::{
    FileWrite, RemoteError, RemoteFile, RemoteRepository, RemoteUser, RepositoryDraft,
    RepositoryHost, RepositoryRef, Result as RemoteResult,
};

use crate::services::SessionContext;
use crate::storage::{GitHubPersonaStore, LocalPersonaStore, METADATA_FILE};
use crate::traits::MemoryKeyValueStore;
use crate::types::{CreatePersonaRequest, Persona, Style, Tone, Voice};

const HOST: &str = "mock";

// ===== MockRepositoryHost =====

/// In-memory repository host with failure switches.
pub struct MockRepositoryHost {
    login: String,
    /// repository name -> path -> file
    repositories: RwLock<BTreeMap<String, HashMap<String, RemoteFile>>>,
    /// Every call fails with a network error
    offline: AtomicBool,
    /// `create_repository` and `put_file` fail with a server error
    fail_writes: AtomicBool,
    /// `delete_repository` fails with a network error
    fail_deletes: AtomicBool,
    next_sha: AtomicU64,
}

impl MockRepositoryHost {
    pub fn new(login: &str) -> Self {
        Self {
            login: login.to_string(),
            repositories: RwLock::new(BTreeMap::new()),
            offline: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            next_sha: AtomicU64::new(1),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    fn sha(&self) -> String {
        format!("sha-{}", self.next_sha.fetch_add(1, Ordering::SeqCst))
    }

    fn check_online(&self) -> RemoteResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::NetworkError {
                host: HOST.to_string(),
                detail: "connection refused".to_string(),
            });
        }
        Ok(())
    }

    fn check_owner(&self, repo: &RepositoryRef) -> RemoteResult<()> {
        if repo.owner == self.login {
            Ok(())
        } else {
            Err(RemoteError::NotFound {
                host: HOST.to_string(),
                resource: repo.to_string(),
            })
        }
    }

    fn server_error() -> RemoteError {
        RemoteError::Api {
            host: HOST.to_string(),
            status: 500,
            message: "Internal Server Error".to_string(),
        }
    }

    /// Put a persona into its repository, bypassing the failure switches.
    pub async fn seed(&self, persona: &Persona) {
        let content = serde_json::to_string_pretty(persona).unwrap();
        self.seed_raw(&GitHubPersonaStore::repository_name(&persona.id), Some(&content))
            .await;
    }

    /// Create a repository holding an arbitrary (or no) metadata file.
    pub async fn seed_raw(&self, name: &str, metadata: Option<&str>) {
        let mut files = HashMap::new();
        if let Some(content) = metadata {
            files.insert(
                METADATA_FILE.to_string(),
                RemoteFile {
                    path: METADATA_FILE.to_string(),
                    sha: self.sha(),
                    content: content.to_string(),
                },
            );
        }
        self.repositories
            .write()
            .await
            .insert(name.to_string(), files);
    }

    /// The persona stored in its repository, if any.
    pub async fn persona(&self, id: &str) -> Option<Persona> {
        let repositories = self.repositories.read().await;
        let file = repositories
            .get(&GitHubPersonaStore::repository_name(id))?
            .get(METADATA_FILE)?;
        Some(serde_json::from_str(&file.content).unwrap())
    }

    pub async fn repository_names(&self) -> Vec<String> {
        self.repositories.read().await.keys().cloned().collect()
    }

    fn repository(&self, name: &str) -> RemoteRepository {
        RemoteRepository {
            name: name.to_string(),
            full_name: format!("{}/{name}", self.login),
            owner: self.login.clone(),
            private: true,
            description: None,
            updated_at: None,
        }
    }
}

#[async_trait]
impl RepositoryHost for MockRepositoryHost {
    fn id(&self) -> &'static str {
        HOST
    }

    async fn authenticate(&self) -> RemoteResult<RemoteUser> {
        self.check_online()?;
        Ok(RemoteUser {
            login: self.login.clone(),
            id: 1,
            name: None,
        })
    }

    async fn list_repositories(&self, prefix: &str) -> RemoteResult<Vec<RemoteRepository>> {
        self.check_online()?;
        Ok(self
            .repositories
            .read()
            .await
            .keys()
            .filter(|name| name.starts_with(prefix))
            .map(|name| self.repository(name))
            .collect())
    }

    async fn create_repository(&self, draft: &RepositoryDraft) -> RemoteResult<RemoteRepository> {
        self.check_online()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        let mut repositories = self.repositories.write().await;
        if repositories.contains_key(&draft.name) {
            return Err(RemoteError::Conflict {
                host: HOST.to_string(),
                resource: draft.name.clone(),
                raw_message: Some("name already exists on this account".to_string()),
            });
        }
        repositories.insert(draft.name.clone(), HashMap::new());
        Ok(self.repository(&draft.name))
    }

    async fn delete_repository(&self, repo: &RepositoryRef) -> RemoteResult<()> {
        self.check_online()?;
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(RemoteError::NetworkError {
                host: HOST.to_string(),
                detail: "connection reset".to_string(),
            });
        }
        self.check_owner(repo)?;
        self.repositories
            .write()
            .await
            .remove(&repo.name)
            .map(|_| ())
            .ok_or_else(|| RemoteError::NotFound {
                host: HOST.to_string(),
                resource: repo.to_string(),
            })
    }

    async fn get_file(&self, repo: &RepositoryRef, path: &str) -> RemoteResult<Option<RemoteFile>> {
        self.check_online()?;
        self.check_owner(repo)?;
        let repositories = self.repositories.read().await;
        let files = repositories.get(&repo.name).ok_or_else(|| RemoteError::NotFound {
            host: HOST.to_string(),
            resource: repo.to_string(),
        })?;
        Ok(files.get(path).cloned())
    }

    async fn put_file(&self, repo: &RepositoryRef, write: &FileWrite) -> RemoteResult<RemoteFile> {
        self.check_online()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        self.check_owner(repo)?;
        let sha = self.sha();
        let mut repositories = self.repositories.write().await;
        let files = repositories
            .get_mut(&repo.name)
            .ok_or_else(|| RemoteError::NotFound {
                host: HOST.to_string(),
                resource: repo.to_string(),
            })?;

        let current = files.get(&write.path).map(|f| f.sha.clone());
        if current != write.sha {
            return Err(RemoteError::Conflict {
                host: HOST.to_string(),
                resource: format!("{repo}:{}", write.path),
                raw_message: Some("sha does not match".to_string()),
            });
        }

        let file = RemoteFile {
            path: write.path.clone(),
            sha,
            content: write.content.clone(),
        };
        files.insert(write.path.clone(), file.clone());
        Ok(file)
    }
}

// ===== Factories =====

/// Session over a fresh in-memory store.
pub fn test_session(user: &str) -> Arc<SessionContext> {
    SessionContext::open(user, Arc::new(MemoryKeyValueStore::new())).unwrap()
}

/// Repository-backed store for `user` over `host`.
pub fn github_store(host: &Arc<MockRepositoryHost>, user: &str) -> GitHubPersonaStore {
    GitHubPersonaStore::new(host.clone(), LocalPersonaStore::new(test_session(user)))
}

/// Persona `id` last updated `t` seconds after a fixed epoch.
pub fn persona_at(id: &str, t: i64) -> Persona {
    let base = DateTime::from_timestamp_millis(1_714_557_600_000).unwrap();
    Persona {
        id: id.to_string(),
        name: format!("Persona {id}"),
        description: String::new(),
        tone: Tone::Professional,
        style: Style::Concise,
        voice: Voice::FirstPerson,
        platform_settings: Vec::new(),
        created_at: base,
        updated_at: base + chrono::Duration::seconds(t),
        github_repo: None,
    }
}

pub fn create_request(name: &str) -> CreatePersonaRequest {
    CreatePersonaRequest {
        name: name.to_string(),
        description: String::new(),
        tone: Tone::Professional,
        style: Style::Concise,
        voice: Voice::FirstPerson,
        platform_settings: Vec::new(),
    }
}
