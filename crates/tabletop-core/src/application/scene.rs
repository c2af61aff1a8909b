//! Scene Application Service
//!
//! Manages scenes with automatic event publication on the table topic.

use std::sync::Arc;
use tracing::info;

use crate::broker::EventPublisher;
use crate::domain::{Scene, SceneId, SceneUpdate, SyncAction, SyncEvent, TableId, UserId};
use crate::error::{SyncError, SyncResult};
use crate::repository::SceneRepository;
use crate::service::AuthorizationGate;

/// Application service for scene management
pub struct SceneAppService {
    scene_repo: Arc<dyn SceneRepository>,
    gate: Arc<AuthorizationGate>,
    publisher: EventPublisher,
}

impl SceneAppService {
    pub fn new(
        scene_repo: Arc<dyn SceneRepository>,
        gate: Arc<AuthorizationGate>,
        publisher: EventPublisher,
    ) -> Self {
        Self {
            scene_repo,
            gate,
            publisher,
        }
    }

    /// Get a scene by ID
    pub async fn get(&self, id: SceneId) -> SyncResult<Option<Scene>> {
        Ok(self.scene_repo.get(id).await?)
    }

    /// Create a new scene (master only)
    ///
    /// Publishes: `SceneCreated`
    pub async fn create(
        &self,
        caller: UserId,
        table_id: TableId,
        name: &str,
        width: i32,
        height: i32,
    ) -> SyncResult<Scene> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SyncError::invalid("scene name is required"));
        }
        validate_dimensions(width, height)?;

        self.gate.require_master(caller, table_id).await?;

        let mut scene = Scene::new(table_id, name, width, height);
        scene.id = self.scene_repo.create(&scene).await?;

        info!(scene_id = scene.id, table_id, "[SceneAppService] Created scene");

        self.publisher.publish(SyncEvent::for_table(
            table_id,
            SyncAction::SceneCreated {
                scene: scene.clone(),
            },
        ));

        Ok(scene)
    }

    /// Update a scene (master only)
    ///
    /// Publishes: `SceneUpdated`
    pub async fn update(
        &self,
        caller: UserId,
        scene_id: SceneId,
        changes: SceneUpdate,
    ) -> SyncResult<Scene> {
        let mut scene = self.load(scene_id).await?;
        self.gate.require_master(caller, scene.table_id).await?;

        if let Some(name) = changes.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(SyncError::invalid("scene name cannot be empty"));
            }
            scene.name = name.to_string();
        }
        validate_dimensions(
            changes.width.unwrap_or(scene.width),
            changes.height.unwrap_or(scene.height),
        )?;
        if let Some(width) = changes.width {
            scene.width = width;
        }
        if let Some(height) = changes.height {
            scene.height = height;
        }

        self.scene_repo.update(&scene).await?;

        info!(scene_id, "[SceneAppService] Updated scene");

        self.publisher.publish(SyncEvent::for_table(
            scene.table_id,
            SyncAction::SceneUpdated {
                scene: scene.clone(),
            },
        ));

        Ok(scene)
    }

    /// Delete a scene that belongs to `table_id` (master only)
    ///
    /// Publishes: `SceneDeleted`
    pub async fn delete(&self, caller: UserId, table_id: TableId, scene_id: SceneId) -> SyncResult<()> {
        let scene = self.load(scene_id).await?;
        if scene.table_id != table_id {
            return Err(SyncError::not_found("scene not found in this table"));
        }
        self.gate.require_master(caller, table_id).await?;

        self.scene_repo.delete(scene_id).await?;

        info!(scene_id, table_id, "[SceneAppService] Deleted scene");

        self.publisher.publish(SyncEvent::for_table(
            table_id,
            SyncAction::SceneDeleted { scene_id },
        ));

        Ok(())
    }

    async fn load(&self, scene_id: SceneId) -> SyncResult<Scene> {
        if scene_id == 0 {
            return Err(SyncError::invalid("scene id is required"));
        }
        self.scene_repo
            .get(scene_id)
            .await?
            .ok_or_else(|| SyncError::not_found("scene not found"))
    }
}

fn validate_dimensions(width: i32, height: i32) -> SyncResult<()> {
    if width <= 0 || height <= 0 {
        return Err(SyncError::invalid("scene width and height must be positive"));
    }
    Ok(())
}
