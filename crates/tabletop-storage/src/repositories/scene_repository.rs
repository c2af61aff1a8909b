//! SQLite implementation of SceneRepository.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use tabletop_core::{Scene, SceneId, SceneRepository};
use tokio::sync::Mutex;

use super::now_rfc3339;
use crate::Database;

/// SQLite-backed implementation of SceneRepository.
pub struct SqliteSceneRepository {
    db: Arc<Mutex<Database>>,
}

impl SqliteSceneRepository {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SceneRepository for SqliteSceneRepository {
    async fn get(&self, id: SceneId) -> Result<Option<Scene>> {
        let db = self.db.lock().await;

        let scene = db
            .connection()
            .query_row(
                "SELECT id, table_id, name, width, height FROM scenes WHERE id = ?1",
                params![id as i64],
                |row| {
                    Ok(Scene {
                        id: row.get::<_, i64>(0)? as SceneId,
                        table_id: row.get::<_, i64>(1)? as u64,
                        name: row.get(2)?,
                        width: row.get(3)?,
                        height: row.get(4)?,
                    })
                },
            )
            .optional()?;

        Ok(scene)
    }

    async fn create(&self, scene: &Scene) -> Result<SceneId> {
        let db = self.db.lock().await;
        let conn = db.connection();
        let now = now_rfc3339();

        conn.execute(
            "INSERT INTO scenes (table_id, name, width, height, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![scene.table_id as i64, scene.name, scene.width, scene.height, now],
        )?;

        let id = conn.last_insert_rowid() as SceneId;
        tracing::debug!("[SceneRepository::create] Created scene {} in table {}", id, scene.table_id);

        Ok(id)
    }

    async fn update(&self, scene: &Scene) -> Result<()> {
        let db = self.db.lock().await;

        db.connection().execute(
            "UPDATE scenes SET name = ?2, width = ?3, height = ?4, updated_at = ?5 WHERE id = ?1",
            params![scene.id as i64, scene.name, scene.width, scene.height, now_rfc3339()],
        )?;

        Ok(())
    }

    async fn delete(&self, id: SceneId) -> Result<()> {
        let db = self.db.lock().await;
        db.connection()
            .execute("DELETE FROM scenes WHERE id = ?1", params![id as i64])?;
        Ok(())
    }
}
