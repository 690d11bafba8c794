//! Persona storage abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::Persona;

/// Persona storage backend
///
/// Implementations:
/// - [`LocalPersonaStore`](crate::LocalPersonaStore): key/value store only
/// - [`GitHubPersonaStore`](crate::GitHubPersonaStore): remote first, degrading to local
/// - [`PersonaBackend`](crate::PersonaBackend): whichever of the two was selected
#[async_trait]
pub trait PersonaStore: Send + Sync {
    /// Save a new persona
    ///
    /// Returns the stored record, which may carry a remote reference.
    /// Fails with `DuplicatePersona` if the id is already present.
    async fn save(&self, persona: Persona) -> CoreResult<Persona>;

    /// Replace an existing persona
    async fn update(&self, persona: Persona) -> CoreResult<Persona>;

    /// Delete a persona
    ///
    /// # Arguments
    /// * `id` - Persona ID
    async fn delete(&self, id: &str) -> CoreResult<()>;

    /// List all personas
    async fn list(&self) -> CoreResult<Vec<Persona>>;

    /// Get persona based on ID
    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Persona>> {
        Ok(self.list().await?.into_iter().find(|p| p.id == id))
    }

    /// Whether the backend can currently serve requests
    async fn is_available(&self) -> bool;
}
