//! Ubikial Core Library
//!
//! Persona storage for Ubikial, including:
//! - Local persona storage over a key/value store (`LocalPersonaStore`)
//! - Repository-backed persona storage with local fallback (`GitHubPersonaStore`)
//! - Backend selection and last-write-wins reconciliation (`PersonaBackend`, `SyncService`)
//! - Encrypted storage of linked platform tokens (`CredentialVault`)
//!
//! The library is platform-independent: key/value persistence and the remote
//! repository host are injected through traits, scoped by a per-user
//! [`SessionContext`].

pub mod crypto;
pub mod error;
pub mod services;
pub mod storage;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::{SessionContext, StorageScope};
pub use storage::{BackendKind, GitHubPersonaStore, LocalPersonaStore, PersonaBackend};
pub use traits::{KeyValueStore, MemoryKeyValueStore, PersonaStore};
