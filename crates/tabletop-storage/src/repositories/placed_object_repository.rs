//! SQLite implementation of PlacedObjectRepository.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use tabletop_core::{
    LayerType, ObjectId, PermissionLevel, PlacedObject, PlacedObjectRepository, SceneId, UserId,
};
use tokio::sync::Mutex;

use super::{now_rfc3339, parse_kind};
use crate::Database;

const SELECT_COLUMNS: &str = "SELECT id, scene_id, library_id, kind, pos_x, pos_y, width, height,
        layer, rotation, can_be_viewed_by, can_be_modified_by
     FROM placed_objects";

/// SQLite-backed implementation of PlacedObjectRepository.
pub struct SqlitePlacedObjectRepository {
    db: Arc<Mutex<Database>>,
}

impl SqlitePlacedObjectRepository {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    /// All objects placed on a scene.
    pub async fn list_for_scene(&self, scene_id: SceneId) -> Result<Vec<PlacedObject>> {
        let db = self.db.lock().await;
        let conn = db.connection();

        let mut stmt = conn.prepare(&format!("{} WHERE scene_id = ?1 ORDER BY id ASC", SELECT_COLUMNS))?;
        let objects = stmt
            .query_map(params![scene_id as i64], Self::row_to_object)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(objects)
    }

    fn row_to_object(row: &Row<'_>) -> rusqlite::Result<PlacedObject> {
        Ok(PlacedObject {
            id: row.get::<_, i64>(0)? as ObjectId,
            scene_id: row.get::<_, i64>(1)? as SceneId,
            library_id: row.get::<_, i64>(2)? as ObjectId,
            kind: parse_kind(row.get::<_, String>(3)?, 3)?,
            pos_x: row.get(4)?,
            pos_y: row.get(5)?,
            width: row.get(6)?,
            height: row.get(7)?,
            layer: LayerType::from_i64(row.get(8)?).unwrap_or_default(),
            rotation: row.get(9)?,
            can_be_viewed_by: PermissionLevel::from_i64(row.get(10)?),
            can_be_modified_by: PermissionLevel::from_i64(row.get(11)?),
        })
    }
}

#[async_trait]
impl PlacedObjectRepository for SqlitePlacedObjectRepository {
    async fn get(&self, id: ObjectId) -> Result<Option<PlacedObject>> {
        let db = self.db.lock().await;

        let object = db
            .connection()
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id as i64],
                Self::row_to_object,
            )
            .optional()?;

        Ok(object)
    }

    async fn create(&self, object: &PlacedObject) -> Result<ObjectId> {
        let db = self.db.lock().await;
        let conn = db.connection();

        conn.execute(
            "INSERT INTO placed_objects (
                scene_id, library_id, kind, pos_x, pos_y, width, height, layer, rotation,
                can_be_viewed_by, can_be_modified_by, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
            params![
                object.scene_id as i64,
                object.library_id as i64,
                object.kind.as_str(),
                object.pos_x,
                object.pos_y,
                object.width,
                object.height,
                object.layer.as_i64(),
                object.rotation,
                object.can_be_viewed_by.as_i64(),
                object.can_be_modified_by.as_i64(),
                now_rfc3339(),
            ],
        )?;

        Ok(conn.last_insert_rowid() as ObjectId)
    }

    async fn update(&self, object: &PlacedObject) -> Result<()> {
        let db = self.db.lock().await;

        db.connection().execute(
            "UPDATE placed_objects SET
                pos_x = ?2, pos_y = ?3, width = ?4, height = ?5, layer = ?6, rotation = ?7,
                can_be_viewed_by = ?8, can_be_modified_by = ?9, updated_at = ?10
             WHERE id = ?1",
            params![
                object.id as i64,
                object.pos_x,
                object.pos_y,
                object.width,
                object.height,
                object.layer.as_i64(),
                object.rotation,
                object.can_be_viewed_by.as_i64(),
                object.can_be_modified_by.as_i64(),
                now_rfc3339(),
            ],
        )?;

        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> Result<()> {
        let db = self.db.lock().await;
        db.connection()
            .execute("DELETE FROM placed_objects WHERE id = ?1", params![id as i64])?;
        Ok(())
    }

    async fn move_to(&self, id: ObjectId, pos_x: i32, pos_y: i32) -> Result<()> {
        let db = self.db.lock().await;

        db.connection().execute(
            "UPDATE placed_objects SET pos_x = ?2, pos_y = ?3, updated_at = ?4 WHERE id = ?1",
            params![id as i64, pos_x, pos_y, now_rfc3339()],
        )?;

        Ok(())
    }

    async fn update_access(
        &self,
        id: ObjectId,
        owners: &[UserId],
        can_be_viewed_by: PermissionLevel,
        can_be_modified_by: PermissionLevel,
    ) -> Result<()> {
        let db = self.db.lock().await;
        let now = now_rfc3339();

        db.transaction(|conn| {
            let updated = conn.execute(
                "UPDATE placed_objects SET can_be_viewed_by = ?2, can_be_modified_by = ?3,
                    updated_at = ?4
                 WHERE id = ?1",
                params![
                    id as i64,
                    can_be_viewed_by.as_i64(),
                    can_be_modified_by.as_i64(),
                    now
                ],
            )?;
            if updated == 0 {
                anyhow::bail!("placed object {} not found", id);
            }

            conn.execute(
                "UPDATE game_object_owners SET deleted_at = ?2
                 WHERE placed_object_id = ?1 AND deleted_at IS NULL",
                params![id as i64, now],
            )?;

            let mut insert = conn.prepare(
                "INSERT INTO game_object_owners (placed_object_id, user_id, created_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(placed_object_id, user_id)
                 DO UPDATE SET deleted_at = NULL, created_at = excluded.created_at",
            )?;
            for user_id in owners {
                insert.execute(params![id as i64, *user_id as i64, now])?;
            }
            Ok(())
        })?;

        tracing::debug!(
            "[PlacedObjectRepository] Updated access of object {} ({} owners)",
            id,
            owners.len()
        );

        Ok(())
    }
}
