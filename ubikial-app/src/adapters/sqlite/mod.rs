//! SQLite-based key/value store using `SeaORM`.
//!
//! Every key is one row of the `kv_entries` table; writes go straight to the
//! database, so [`flush`](KeyValueStore::flush) has nothing to do.

pub(crate) mod entity;
mod migration;

use std::path::Path;

use async_trait::async_trait;
use sea_orm::{ActiveValue::Set, Database, DatabaseConnection, EntityTrait};
use sea_orm_migration::MigratorTrait;
use ubikial_core::error::{CoreError, CoreResult};
use ubikial_core::traits::KeyValueStore;
use ubikial_core::utils::datetime;

use entity::kv_entry;
use migration::Migrator;

/// SQLite-based key/value store.
pub struct SqliteKeyValueStore {
    db: DatabaseConnection,
}

impl SqliteKeyValueStore {
    /// Open (or create) the database at `db_path` and bring its schema up to date.
    ///
    /// # Errors
    /// Returns `CoreError::StorageError` if directory creation, database
    /// connection, or schema migration fails.
    pub async fn new(db_path: &Path) -> CoreResult<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::StorageError(format!("Failed to create directory: {e}")))?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let db = Database::connect(&db_url)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to connect to SQLite: {e}")))?;

        Migrator::up(&db, None)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to run migrations: {e}")))?;

        log::debug!("Opened SQLite store {}", db_path.display());
        Ok(Self { db })
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        let row = kv_entry::Entity::find_by_id(key)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to query '{key}': {e}")))?;
        Ok(row.map(|r| r.value))
    }

    async fn set(&self, key: &str, value: String) -> CoreResult<()> {
        let model = kv_entry::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            updated_at: Set(datetime::format(&datetime::now_millis())),
        };

        kv_entry::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(kv_entry::Column::Key)
                    .update_columns([kv_entry::Column::Value, kv_entry::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to write '{key}': {e}")))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> CoreResult<()> {
        kv_entry::Entity::delete_by_id(key)
            .exec(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to delete '{key}': {e}")))?;
        Ok(())
    }
}
