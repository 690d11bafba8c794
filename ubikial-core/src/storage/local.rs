//! Local persona storage over the session's key/value store

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{CoreError, CoreResult};
use crate::services::{SessionContext, StorageScope};
use crate::traits::PersonaStore;
use crate::types::Persona;

/// Persona store keeping the whole collection as one JSON array under
/// `personas_<userId>`.
#[derive(Debug, Clone)]
pub struct LocalPersonaStore {
    session: Arc<SessionContext>,
}

impl LocalPersonaStore {
    #[must_use]
    pub fn new(session: Arc<SessionContext>) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    async fn load(&self) -> CoreResult<Vec<Persona>> {
        Ok(self
            .session
            .read_json::<Vec<Persona>>(StorageScope::Personas)
            .await?
            .unwrap_or_default())
    }

    async fn persist(&self, personas: &[Persona]) -> CoreResult<()> {
        self.session
            .write_json(StorageScope::Personas, personas)
            .await
    }

    /// Insert or replace a record by id, keeping collection order.
    pub async fn upsert(&self, persona: &Persona) -> CoreResult<()> {
        let mut personas = self.load().await?;
        match personas.iter_mut().find(|p| p.id == persona.id) {
            Some(existing) => *existing = persona.clone(),
            None => personas.push(persona.clone()),
        }
        self.persist(&personas).await
    }
}

#[async_trait]
impl PersonaStore for LocalPersonaStore {
    async fn save(&self, persona: Persona) -> CoreResult<Persona> {
        let mut personas = self.load().await?;
        if personas.iter().any(|p| p.id == persona.id) {
            return Err(CoreError::DuplicatePersona(persona.id));
        }
        personas.push(persona.clone());
        self.persist(&personas).await?;
        Ok(persona)
    }

    async fn update(&self, persona: Persona) -> CoreResult<Persona> {
        let mut personas = self.load().await?;
        let existing = personas
            .iter_mut()
            .find(|p| p.id == persona.id)
            .ok_or_else(|| CoreError::PersonaNotFound(persona.id.clone()))?;
        *existing = persona.clone();
        self.persist(&personas).await?;
        Ok(persona)
    }

    async fn delete(&self, id: &str) -> CoreResult<()> {
        let mut personas = self.load().await?;
        let before = personas.len();
        personas.retain(|p| p.id != id);
        if personas.len() != before {
            self.persist(&personas).await?;
        }
        Ok(())
    }

    async fn list(&self) -> CoreResult<Vec<Persona>> {
        self.load().await
    }

    async fn is_available(&self) -> bool {
        !self.session.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{persona_at, test_session};

    fn store() -> LocalPersonaStore {
        LocalPersonaStore::new(test_session("alice"))
    }

    #[tokio::test]
    async fn save_and_list_preserve_order() {
        let store = store();
        store.save(persona_at("a", 1)).await.unwrap();
        store.save(persona_at("b", 2)).await.unwrap();

        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(store.is_available().await);
    }

    #[tokio::test]
    async fn save_rejects_duplicate_id() {
        let store = store();
        store.save(persona_at("a", 1)).await.unwrap();

        let result = store.save(persona_at("a", 5)).await;
        assert!(matches!(result, Err(CoreError::DuplicatePersona(id)) if id == "a"));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_replaces_record() {
        let store = store();
        store.save(persona_at("a", 1)).await.unwrap();

        let mut changed = persona_at("a", 2);
        changed.name = "Renamed".to_string();
        store.update(changed).await.unwrap();

        let found = store.find_by_id("a").await.unwrap().unwrap();
        assert_eq!(found.name, "Renamed");
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let result = store().update(persona_at("ghost", 1)).await;
        assert!(matches!(result, Err(CoreError::PersonaNotFound(_))));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = store();
        store.save(persona_at("a", 1)).await.unwrap();

        store.delete("a").await.unwrap();
        store.delete("a").await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upsert_inserts_then_replaces() {
        let store = store();
        store.upsert(&persona_at("a", 1)).await.unwrap();
        store.upsert(&persona_at("a", 3)).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], persona_at("a", 3));
    }

    #[tokio::test]
    async fn closed_session_is_unavailable() {
        let store = store();
        store.session().close().await.unwrap();

        assert!(!store.is_available().await);
        assert!(matches!(store.list().await, Err(CoreError::SessionClosed)));
    }
}
