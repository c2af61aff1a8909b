//! SQLite implementation of ObjectOwnerRepository.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::params;
use tabletop_core::{ObjectId, ObjectOwnerRepository, UserId};
use tokio::sync::Mutex;

use crate::Database;

/// SQLite-backed implementation of ObjectOwnerRepository.
pub struct SqliteObjectOwnerRepository {
    db: Arc<Mutex<Database>>,
}

impl SqliteObjectOwnerRepository {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ObjectOwnerRepository for SqliteObjectOwnerRepository {
    async fn is_owner(&self, user_id: UserId, object_id: ObjectId) -> Result<bool> {
        let db = self.db.lock().await;

        let exists: bool = db.connection().query_row(
            "SELECT EXISTS(
                SELECT 1 FROM game_object_owners
                WHERE placed_object_id = ?1 AND user_id = ?2 AND deleted_at IS NULL
            )",
            params![object_id as i64, user_id as i64],
            |row| row.get(0),
        )?;

        Ok(exists)
    }

    async fn list_owners(&self, object_id: ObjectId) -> Result<Vec<UserId>> {
        let db = self.db.lock().await;
        let conn = db.connection();

        let mut stmt = conn.prepare(
            "SELECT user_id FROM game_object_owners
             WHERE placed_object_id = ?1 AND deleted_at IS NULL
             ORDER BY created_at ASC, user_id ASC",
        )?;

        let owners = stmt
            .query_map(params![object_id as i64], |row| {
                row.get::<_, i64>(0).map(|id| id as UserId)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(owners)
    }
}
