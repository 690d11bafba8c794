//! Storage layer abstraction trait definition

mod key_value_store;
mod persona_store;

pub use key_value_store::{KeyValueStore, MemoryKeyValueStore};
pub use persona_store::PersonaStore;
