//! Repository-backed persona storage
//!
//! Each persona lives in its own repository, `ubikial-persona-<id>`, as a
//! single `persona.json` file. Every write is mirrored into the local store,
//! and any remote failure degrades to the local store with a warning.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use ubikial_github::{
    FileWrite, RemoteError, RepositoryDraft, RepositoryHost, RepositoryRef,
};

use crate::error::{CoreError, CoreResult};
use crate::traits::PersonaStore;
use crate::types::Persona;

use super::LocalPersonaStore;

/// Name prefix of persona repositories.
pub const REPOSITORY_PREFIX: &str = "ubikial-persona-";

/// Metadata file holding the serialized persona.
pub const METADATA_FILE: &str = "persona.json";

/// A persona read from its repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePersona {
    pub repository: RepositoryRef,
    /// Blob sha of the metadata file, needed to overwrite it.
    pub sha: String,
    pub persona: Persona,
}

/// Persona store preferring a remote repository host.
pub struct GitHubPersonaStore {
    host: Arc<dyn RepositoryHost>,
    local: LocalPersonaStore,
    /// Login of the authenticated account, resolved once.
    owner: OnceCell<String>,
}

impl GitHubPersonaStore {
    #[must_use]
    pub fn new(host: Arc<dyn RepositoryHost>, local: LocalPersonaStore) -> Self {
        Self {
            host,
            local,
            owner: OnceCell::new(),
        }
    }

    /// The local mirror.
    #[must_use]
    pub fn local(&self) -> &LocalPersonaStore {
        &self.local
    }

    /// Identifier of the remote host (e.g. `github`).
    #[must_use]
    pub fn host_id(&self) -> &'static str {
        self.host.id()
    }

    /// Repository name of a persona.
    #[must_use]
    pub fn repository_name(persona_id: &str) -> String {
        format!("{REPOSITORY_PREFIX}{persona_id}")
    }

    /// Check the credential against the host, remembering the account login.
    pub async fn authenticate(&self) -> CoreResult<&str> {
        let owner = self
            .owner
            .get_or_try_init(|| async {
                let user = self.host.authenticate().await?;
                Ok::<_, RemoteError>(user.login)
            })
            .await?;
        Ok(owner.as_str())
    }

    async fn derived_repository(&self, persona_id: &str) -> CoreResult<RepositoryRef> {
        let owner = self.authenticate().await?;
        Ok(RepositoryRef::new(owner, Self::repository_name(persona_id)))
    }

    async fn create_repository(&self, persona: &Persona) -> CoreResult<RepositoryRef> {
        let draft = RepositoryDraft {
            name: Self::repository_name(&persona.id),
            description: Some(format!("Ubikial persona: {}", persona.name)),
            private: true,
        };
        match self.host.create_repository(&draft).await {
            Ok(repo) => Ok(repo.repo_ref()),
            // Left behind by an earlier, partially failed save
            Err(RemoteError::Conflict { .. }) => {
                log::debug!("Repository {} already exists, reusing it", draft.name);
                self.derived_repository(&persona.id).await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, repo: &RepositoryRef, persona: &Persona, sha: Option<String>) -> CoreResult<()> {
        let sha = match sha {
            Some(sha) => Some(sha),
            None => self
                .host
                .get_file(repo, METADATA_FILE)
                .await?
                .map(|f| f.sha),
        };
        let message = if sha.is_some() {
            format!("Update persona '{}'", persona.name)
        } else {
            format!("Create persona '{}'", persona.name)
        };
        let write = FileWrite {
            path: METADATA_FILE.to_string(),
            content: serde_json::to_string_pretty(persona)?,
            message,
            sha,
        };
        self.host.put_file(repo, &write).await?;
        log::debug!("Wrote persona {} to {repo}", persona.id);
        Ok(())
    }

    /// Write a persona to its repository, creating the repository first if
    /// the record has no reference yet.
    ///
    /// Returns the record carrying its repository reference. `updated_at` is
    /// left untouched. Nothing is written locally.
    pub async fn push(&self, persona: &Persona) -> CoreResult<Persona> {
        let mut pushed = persona.clone();
        let repo = match persona.repository() {
            Some(repo) => repo,
            None => self.create_repository(persona).await?,
        };
        pushed.github_repo = Some(repo.to_string());
        self.write(&repo, &pushed, None).await?;
        Ok(pushed)
    }

    /// Overwrite a remote record whose location and blob sha are known.
    pub(crate) async fn push_over(&self, target: &RemotePersona, persona: &Persona) -> CoreResult<Persona> {
        let mut pushed = persona.clone();
        pushed.github_repo = Some(target.repository.to_string());
        self.write(&target.repository, &pushed, Some(target.sha.clone()))
            .await?;
        Ok(pushed)
    }

    /// Read every persona repository and its metadata file.
    ///
    /// Repositories without a readable metadata file are skipped with a
    /// warning; any host error fails the whole read.
    pub async fn fetch_remote(&self) -> CoreResult<Vec<RemotePersona>> {
        let repositories = self.host.list_repositories(REPOSITORY_PREFIX).await?;
        let mut personas = Vec::with_capacity(repositories.len());

        for repository in repositories {
            let repo = repository.repo_ref();
            let Some(file) = self.host.get_file(&repo, METADATA_FILE).await? else {
                log::warn!("Skipping {repo}: no {METADATA_FILE}");
                continue;
            };
            let persona: Persona = match serde_json::from_str(&file.content) {
                Ok(persona) => persona,
                Err(e) => {
                    log::warn!("Skipping {repo}: invalid {METADATA_FILE}: {e}");
                    continue;
                }
            };
            if repo.name != Self::repository_name(&persona.id) {
                log::warn!(
                    "Skipping {repo}: holds persona {} which belongs elsewhere",
                    persona.id
                );
                continue;
            }
            personas.push(RemotePersona {
                repository: repo,
                sha: file.sha,
                persona,
            });
        }

        log::debug!("Fetched {} remote personas", personas.len());
        Ok(personas)
    }
}

fn log_fallback(operation: &str, persona_id: &str, error: &CoreError) {
    log::warn!("Remote {operation} of persona {persona_id} failed, using local storage: {error}");
}

#[async_trait]
impl PersonaStore for GitHubPersonaStore {
    async fn save(&self, persona: Persona) -> CoreResult<Persona> {
        self.local.session().ensure_open()?;
        if self.local.find_by_id(&persona.id).await?.is_some() {
            return Err(CoreError::DuplicatePersona(persona.id));
        }

        match self.push(&persona).await {
            Ok(mirrored) => self.local.save(mirrored).await,
            Err(e) => {
                log_fallback("save", &persona.id, &e);
                let mut persona = persona;
                persona.github_repo = None;
                self.local.save(persona).await
            }
        }
    }

    async fn update(&self, persona: Persona) -> CoreResult<Persona> {
        self.local.session().ensure_open()?;
        let stored = match self.push(&persona).await {
            Ok(mirrored) => mirrored,
            Err(e) => {
                log_fallback("update", &persona.id, &e);
                persona
            }
        };
        self.local.upsert(&stored).await?;
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> CoreResult<()> {
        self.local.session().ensure_open()?;
        let known = self
            .local
            .find_by_id(id)
            .await?
            .and_then(|p| p.repository());
        let repo = match known {
            Some(repo) => Ok(repo),
            None => self.derived_repository(id).await,
        };

        let remote = match repo {
            Ok(repo) => self.host.delete_repository(&repo).await.map_err(CoreError::from),
            Err(e) => Err(e),
        };
        match remote {
            Ok(()) => log::info!("Deleted remote repository of persona {id}"),
            Err(CoreError::Remote(RemoteError::NotFound { .. })) => {
                log::debug!("Persona {id} has no remote repository");
            }
            Err(e) => log_fallback("delete", id, &e),
        }

        self.local.delete(id).await
    }

    async fn list(&self) -> CoreResult<Vec<Persona>> {
        self.local.session().ensure_open()?;
        match self.fetch_remote().await {
            Ok(remote) => {
                let mut personas: Vec<Persona> = remote.into_iter().map(|r| r.persona).collect();
                // Saved locally while the host failed; pushed by the next sync
                let unpushed: Vec<Persona> = self
                    .local
                    .list()
                    .await?
                    .into_iter()
                    .filter(|p| p.github_repo.is_none() && !personas.iter().any(|r| r.id == p.id))
                    .collect();
                personas.extend(unpushed);
                Ok(personas)
            }
            Err(e) => {
                log::warn!("Remote list failed, using local storage: {e}");
                self.local.list().await
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Persona>> {
        // The mirror holds every record written through this store
        if let Some(persona) = self.local.find_by_id(id).await? {
            return Ok(Some(persona));
        }
        Ok(self.list().await?.into_iter().find(|p| p.id == id))
    }

    async fn is_available(&self) -> bool {
        if self.local.session().is_closed() {
            return false;
        }
        match self.host.authenticate().await {
            Ok(user) => {
                // Already set when an earlier call authenticated
                self.owner.set(user.login).ok();
                true
            }
            Err(e) => {
                log::debug!("Remote host unavailable: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockRepositoryHost, github_store, persona_at};

    fn setup() -> (Arc<MockRepositoryHost>, GitHubPersonaStore) {
        let host = Arc::new(MockRepositoryHost::new("octocat"));
        let store = github_store(&host, "alice");
        (host, store)
    }

    #[tokio::test]
    async fn save_mirrors_to_remote_and_local() {
        let (host, store) = setup();

        let saved = store.save(persona_at("a", 1)).await.unwrap();
        assert_eq!(saved.github_repo.as_deref(), Some("octocat/ubikial-persona-a"));
        assert_eq!(host.persona("a").await.unwrap(), saved);
        assert_eq!(store.local().find_by_id("a").await.unwrap().unwrap(), saved);
    }

    #[tokio::test]
    async fn save_while_unreachable_keeps_local_copy_without_ref() {
        let (host, store) = setup();
        host.set_offline(true);

        let saved = store.save(persona_at("a", 1)).await.unwrap();
        assert_eq!(saved.id, "a");
        assert!(saved.github_repo.is_none());
        assert_eq!(store.local().list().await.unwrap(), vec![saved]);
        assert!(host.repository_names().await.is_empty());
    }

    #[tokio::test]
    async fn save_failing_write_falls_back_to_local() {
        let (host, store) = setup();
        host.set_fail_writes(true);

        let saved = store.save(persona_at("a", 1)).await.unwrap();
        assert!(saved.github_repo.is_none());
        assert!(store.local().find_by_id("a").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn save_reuses_existing_repository() {
        let (host, store) = setup();
        host.seed_raw("ubikial-persona-a", None).await;

        let saved = store.save(persona_at("a", 1)).await.unwrap();
        assert_eq!(saved.github_repo.as_deref(), Some("octocat/ubikial-persona-a"));
        assert_eq!(host.persona("a").await.unwrap(), saved);
    }

    #[tokio::test]
    async fn save_duplicate_is_rejected() {
        let (_host, store) = setup();
        store.save(persona_at("a", 1)).await.unwrap();

        let result = store.save(persona_at("a", 2)).await;
        assert!(matches!(result, Err(CoreError::DuplicatePersona(_))));
    }

    #[tokio::test]
    async fn update_overwrites_remote_file() {
        let (host, store) = setup();
        let mut persona = store.save(persona_at("a", 1)).await.unwrap();

        persona.name = "Renamed".to_string();
        persona.updated_at = persona_at("a", 2).updated_at;
        let updated = store.update(persona).await.unwrap();

        assert_eq!(host.persona("a").await.unwrap().name, "Renamed");
        assert_eq!(store.local().find_by_id("a").await.unwrap().unwrap(), updated);
    }

    #[tokio::test]
    async fn update_while_unreachable_is_local_only() {
        let (host, store) = setup();
        let mut persona = store.save(persona_at("a", 1)).await.unwrap();
        host.set_offline(true);

        persona.name = "Offline edit".to_string();
        store.update(persona).await.unwrap();

        host.set_offline(false);
        assert_eq!(host.persona("a").await.unwrap().name, "Persona a");
        let local = store.local().find_by_id("a").await.unwrap().unwrap();
        assert_eq!(local.name, "Offline edit");
    }

    #[tokio::test]
    async fn delete_removes_local_even_when_remote_delete_fails() {
        let (host, store) = setup();
        store.save(persona_at("a", 1)).await.unwrap();
        host.set_fail_deletes(true);

        store.delete("a").await.unwrap();

        assert!(store.local().find_by_id("a").await.unwrap().is_none());
        assert_eq!(host.repository_names().await, vec!["ubikial-persona-a"]);
    }

    #[tokio::test]
    async fn delete_while_unreachable_removes_local() {
        let (host, store) = setup();
        store.save(persona_at("a", 1)).await.unwrap();
        store.save(persona_at("b", 1)).await.unwrap();
        host.set_offline(true);

        store.delete("a").await.unwrap();
        let ids: Vec<_> = store.local().list().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[tokio::test]
    async fn delete_removes_repository() {
        let (host, store) = setup();
        store.save(persona_at("a", 1)).await.unwrap();

        store.delete("a").await.unwrap();
        assert!(host.repository_names().await.is_empty());
        assert!(store.local().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_without_local_ref_uses_derived_repository() {
        let (host, store) = setup();
        host.seed(&persona_at("r", 1)).await;

        store.delete("r").await.unwrap();
        assert!(host.repository_names().await.is_empty());
    }

    #[tokio::test]
    async fn list_prefers_remote_and_keeps_unpushed_local_records() {
        let (host, store) = setup();
        store.local().upsert(&persona_at("unpushed", 1)).await.unwrap();
        let mut stale = persona_at("stale", 1);
        stale.github_repo = Some("octocat/ubikial-persona-stale".to_string());
        store.local().upsert(&stale).await.unwrap();
        host.seed(&persona_at("r", 2)).await;

        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["r", "unpushed"]);
    }

    #[tokio::test]
    async fn list_shows_record_saved_during_remote_failure() {
        let (host, store) = setup();
        host.seed(&persona_at("r", 1)).await;
        host.set_fail_writes(true);
        let saved = store.save(persona_at("a", 2)).await.unwrap();
        assert!(saved.github_repo.is_none());
        host.set_fail_writes(false);

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.contains(&saved));
    }

    #[tokio::test]
    async fn list_falls_back_to_local() {
        let (host, store) = setup();
        store.local().upsert(&persona_at("local-only", 1)).await.unwrap();
        host.set_offline(true);

        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["local-only"]);
    }

    #[tokio::test]
    async fn find_by_id_checks_mirror_then_remote() {
        let (host, store) = setup();
        store.local().upsert(&persona_at("local-only", 1)).await.unwrap();
        host.seed(&persona_at("remote-only", 1)).await;

        assert!(store.find_by_id("local-only").await.unwrap().is_some());
        assert!(store.find_by_id("remote-only").await.unwrap().is_some());
        assert!(store.find_by_id("nowhere").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fetch_remote_skips_unreadable_repositories() {
        let (host, store) = setup();
        host.seed(&persona_at("good", 1)).await;
        host.seed_raw("ubikial-persona-empty", None).await;
        host.seed_raw("ubikial-persona-broken", Some("{ not json")).await;

        let remote = store.fetch_remote().await.unwrap();
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].persona.id, "good");
        assert_eq!(remote[0].repository.to_string(), "octocat/ubikial-persona-good");
    }

    #[tokio::test]
    async fn fetch_remote_propagates_host_errors() {
        let (host, store) = setup();
        host.set_offline(true);
        assert!(matches!(
            store.fetch_remote().await,
            Err(CoreError::Remote(RemoteError::NetworkError { .. }))
        ));
    }

    #[tokio::test]
    async fn availability_follows_authentication() {
        let (host, store) = setup();
        assert!(store.is_available().await);
        assert_eq!(store.authenticate().await.unwrap(), "octocat");

        host.set_offline(true);
        assert!(!store.is_available().await);
    }

    #[tokio::test]
    async fn closed_session_rejects_operations() {
        let (_host, store) = setup();
        store.local().session().close().await.unwrap();

        assert!(!store.is_available().await);
        assert!(matches!(
            store.save(persona_at("a", 1)).await,
            Err(CoreError::SessionClosed)
        ));
        assert!(matches!(store.list().await, Err(CoreError::SessionClosed)));
    }
}
