//! SQLite implementation of LibraryRepository.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use tabletop_core::{LibraryObject, LibraryRepository, ObjectId, PermissionLevel};
use tokio::sync::Mutex;

use super::{now_rfc3339, parse_kind};
use crate::Database;

/// SQLite-backed implementation of LibraryRepository.
pub struct SqliteLibraryRepository {
    db: Arc<Mutex<Database>>,
}

impl SqliteLibraryRepository {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    fn row_to_object(row: &Row<'_>) -> rusqlite::Result<LibraryObject> {
        Ok(LibraryObject {
            id: row.get::<_, i64>(0)? as ObjectId,
            table_id: row.get::<_, i64>(1)? as u64,
            kind: parse_kind(row.get::<_, String>(2)?, 2)?,
            name: row.get(3)?,
            image_url: row.get(4)?,
            visibility: PermissionLevel::from_i64(row.get(5)?),
        })
    }
}

#[async_trait]
impl LibraryRepository for SqliteLibraryRepository {
    async fn get(&self, id: ObjectId) -> Result<Option<LibraryObject>> {
        let db = self.db.lock().await;

        let object = db
            .connection()
            .query_row(
                "SELECT id, table_id, kind, name, image_url, visibility
                 FROM library_objects WHERE id = ?1",
                params![id as i64],
                Self::row_to_object,
            )
            .optional()?;

        Ok(object)
    }

    async fn create(&self, object: &LibraryObject) -> Result<ObjectId> {
        let db = self.db.lock().await;
        let conn = db.connection();

        conn.execute(
            "INSERT INTO library_objects (table_id, kind, name, image_url, visibility, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                object.table_id as i64,
                object.kind.as_str(),
                object.name,
                object.image_url,
                object.visibility.as_i64(),
                now_rfc3339(),
            ],
        )?;

        Ok(conn.last_insert_rowid() as ObjectId)
    }

    async fn update(&self, object: &LibraryObject) -> Result<()> {
        let db = self.db.lock().await;

        db.connection().execute(
            "UPDATE library_objects SET name = ?2, image_url = ?3, visibility = ?4, updated_at = ?5
             WHERE id = ?1",
            params![
                object.id as i64,
                object.name,
                object.image_url,
                object.visibility.as_i64(),
                now_rfc3339(),
            ],
        )?;

        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> Result<()> {
        let db = self.db.lock().await;
        db.connection()
            .execute("DELETE FROM library_objects WHERE id = ?1", params![id as i64])?;
        Ok(())
    }

    async fn set_visibility(&self, id: ObjectId, visibility: PermissionLevel) -> Result<()> {
        let db = self.db.lock().await;

        db.connection().execute(
            "UPDATE library_objects SET visibility = ?2, updated_at = ?3 WHERE id = ?1",
            params![id as i64, visibility.as_i64(), now_rfc3339()],
        )?;

        Ok(())
    }
}
