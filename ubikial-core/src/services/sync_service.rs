//! Last-write-wins reconciliation of local and remote persona collections

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::CoreResult;
use crate::storage::{GitHubPersonaStore, RemotePersona};
use crate::traits::PersonaStore;
use crate::types::{Persona, SyncReport};

/// One step of a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Only present locally: create the repository and write the record
    Push(Persona),
    /// Local copy is newer: overwrite the remote copy
    Overwrite { local: Persona, remote: RemotePersona },
    /// Remote copy is newer: replace the local copy
    Pull(Persona),
    /// Only present remotely: write into local storage
    Import(Persona),
    /// Equal `updated_at` on both sides: left as is, even if the contents differ
    Unchanged(String),
}

impl SyncAction {
    /// Id of the persona the action applies to.
    #[must_use]
    pub fn persona_id(&self) -> &str {
        match self {
            Self::Push(p) | Self::Pull(p) | Self::Import(p) => &p.id,
            Self::Overwrite { local, .. } => &local.id,
            Self::Unchanged(id) => id,
        }
    }
}

/// Sync service
///
/// Compares records by id and `updated_at` only; there is no per-field
/// merge and no conflict detection.
pub struct SyncService<'a> {
    store: &'a GitHubPersonaStore,
}

impl<'a> SyncService<'a> {
    #[must_use]
    pub fn new(store: &'a GitHubPersonaStore) -> Self {
        Self { store }
    }

    /// Decide what to do with every record.
    ///
    /// Local records come first in local order, followed by remote-only
    /// records in remote order.
    #[must_use]
    pub fn plan(local: Vec<Persona>, remote: Vec<RemotePersona>) -> Vec<SyncAction> {
        let remote_order: Vec<String> = remote.iter().map(|r| r.persona.id.clone()).collect();
        let mut remote_by_id: HashMap<String, RemotePersona> = remote
            .into_iter()
            .map(|r| (r.persona.id.clone(), r))
            .collect();

        let mut actions = Vec::with_capacity(local.len() + remote_by_id.len());
        for persona in local {
            let action = match remote_by_id.remove(&persona.id) {
                None => SyncAction::Push(persona),
                Some(remote) => match persona.updated_at.cmp(&remote.persona.updated_at) {
                    Ordering::Greater => SyncAction::Overwrite {
                        local: persona,
                        remote,
                    },
                    Ordering::Less => SyncAction::Pull(remote.persona),
                    Ordering::Equal => SyncAction::Unchanged(persona.id),
                },
            };
            actions.push(action);
        }

        actions.extend(
            remote_order
                .iter()
                .filter_map(|id| remote_by_id.remove(id))
                .map(|r| SyncAction::Import(r.persona)),
        );
        actions
    }

    /// Reconcile the local and remote collections.
    ///
    /// Records are processed one at a time. The first error (including
    /// failing to read the remote collection) aborts the run; records
    /// already written stay written.
    pub async fn reconcile(&self) -> CoreResult<SyncReport> {
        let local = self.store.local().list().await?;
        let remote = self.store.fetch_remote().await?;
        log::info!(
            "Reconciling {} local and {} remote personas",
            local.len(),
            remote.len()
        );

        let mut report = SyncReport::default();
        for action in Self::plan(local, remote) {
            log::debug!("Sync {}: {action:?}", action.persona_id());
            match action {
                SyncAction::Push(persona) => {
                    // A stale reference points at a repository that no longer holds the record
                    let mut unlinked = persona.clone();
                    unlinked.github_repo = None;
                    let pushed = self.store.push(&unlinked).await?;
                    self.mirror_locally(&persona, &pushed).await?;
                    report.pushed += 1;
                }
                SyncAction::Overwrite { local, remote } => {
                    let pushed = self.store.push_over(&remote, &local).await?;
                    self.mirror_locally(&local, &pushed).await?;
                    report.pushed += 1;
                }
                SyncAction::Pull(persona) => {
                    self.store.local().upsert(&persona).await?;
                    report.pulled += 1;
                }
                SyncAction::Import(persona) => {
                    self.store.local().upsert(&persona).await?;
                    report.imported += 1;
                }
                SyncAction::Unchanged(_) => report.unchanged += 1,
            }
        }

        log::info!(
            "Sync complete: {} pushed, {} pulled, {} imported, {} unchanged",
            report.pushed,
            report.pulled,
            report.imported,
            report.unchanged
        );
        Ok(report)
    }

    /// Store the pushed record locally when pushing changed its reference.
    async fn mirror_locally(&self, before: &Persona, pushed: &Persona) -> CoreResult<()> {
        if before != pushed {
            self.store.local().upsert(pushed).await?;
        }
        Ok(())
    }
}
