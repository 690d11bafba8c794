//! Platform-agnostic storage adapters for the CLI and other non-browser frontends.

mod file_store;

pub use file_store::FileKeyValueStore;

#[cfg(feature = "sqlite-store")]
mod sqlite;

#[cfg(feature = "sqlite-store")]
pub use sqlite::SqliteKeyValueStore;
