//! Placed Object Application Service
//!
//! Places library tokens and images on scenes and keeps them in sync.
//! Structural changes (placing) need the table master; editing, moving and
//! removing are also open to the object's owners.

use std::sync::Arc;
use tracing::info;

use crate::broker::EventPublisher;
use crate::domain::{
    ObjectId, PlaceObject, PlacedObject, PlacedObjectUpdate, Scene, SceneId, SyncAction,
    SyncEvent, UserId,
};
use crate::error::{SyncError, SyncResult};
use crate::repository::{LibraryRepository, PlacedObjectRepository, SceneRepository};
use crate::service::AuthorizationGate;

/// Application service for placed tokens and images
pub struct PlacedObjectAppService {
    placed_repo: Arc<dyn PlacedObjectRepository>,
    scene_repo: Arc<dyn SceneRepository>,
    library_repo: Arc<dyn LibraryRepository>,
    gate: Arc<AuthorizationGate>,
    publisher: EventPublisher,
}

impl PlacedObjectAppService {
    pub fn new(
        placed_repo: Arc<dyn PlacedObjectRepository>,
        scene_repo: Arc<dyn SceneRepository>,
        library_repo: Arc<dyn LibraryRepository>,
        gate: Arc<AuthorizationGate>,
        publisher: EventPublisher,
    ) -> Self {
        Self {
            placed_repo,
            scene_repo,
            library_repo,
            gate,
            publisher,
        }
    }

    pub async fn get(&self, id: ObjectId) -> SyncResult<Option<PlacedObject>> {
        Ok(self.placed_repo.get(id).await?)
    }

    /// Place a library object on a scene (master only)
    ///
    /// Publishes: `PlacedTokenCreated` or `PlacedImageCreated`
    pub async fn place(
        &self,
        caller: UserId,
        scene_id: SceneId,
        request: PlaceObject,
    ) -> SyncResult<PlacedObject> {
        if request.library_id == 0 {
            return Err(SyncError::invalid("library object id is required"));
        }
        if request.width.is_some_and(|w| w <= 0) || request.height.is_some_and(|h| h <= 0) {
            return Err(SyncError::invalid("width and height must be positive"));
        }

        let scene = self.load_scene(scene_id).await?;
        self.gate.require_master(caller, scene.table_id).await?;

        let library = self
            .library_repo
            .get(request.library_id)
            .await?
            .filter(|object| object.table_id == scene.table_id)
            .ok_or_else(|| SyncError::not_found("library object not found in this table"))?;

        let mut placed =
            PlacedObject::new(scene_id, library.id, library.kind).at(request.pos_x, request.pos_y);
        if let Some(width) = request.width {
            placed.width = width;
        }
        if let Some(height) = request.height {
            placed.height = height;
        }
        if let Some(layer) = request.layer {
            placed.layer = layer;
        }
        placed.id = self.placed_repo.create(&placed).await?;

        info!(
            object_id = placed.id,
            scene_id,
            kind = placed.kind.as_str(),
            "[PlacedObjectAppService] Placed object"
        );

        self.publisher.publish(SyncEvent::for_scene(
            scene_id,
            SyncAction::placed_created(placed.clone()),
        ));

        Ok(placed)
    }

    /// Edit size, layer or rotation (master or owner)
    ///
    /// Publishes: `PlacedTokenUpdated` or `PlacedImageUpdated`
    pub async fn update(
        &self,
        caller: UserId,
        object_id: ObjectId,
        changes: PlacedObjectUpdate,
    ) -> SyncResult<PlacedObject> {
        if changes.width.is_some_and(|w| w <= 0) || changes.height.is_some_and(|h| h <= 0) {
            return Err(SyncError::invalid("width and height must be positive"));
        }

        let (mut placed, scene) = self.load_with_scene(object_id).await?;
        self.gate
            .require_master_or_owner(caller, scene.table_id, object_id)
            .await?;

        if let Some(width) = changes.width {
            placed.width = width;
        }
        if let Some(height) = changes.height {
            placed.height = height;
        }
        if let Some(layer) = changes.layer {
            placed.layer = layer;
        }
        if let Some(rotation) = changes.rotation {
            placed.rotation = rotation.rem_euclid(360);
        }

        self.placed_repo.update(&placed).await?;

        info!(object_id, scene_id = placed.scene_id, "[PlacedObjectAppService] Updated object");

        self.publisher.publish(SyncEvent::for_scene(
            placed.scene_id,
            SyncAction::placed_updated(placed.clone()),
        ));

        Ok(placed)
    }

    /// Remove an object from its scene (master or owner)
    ///
    /// Publishes: `PlacedTokenDeleted` or `PlacedImageDeleted`
    pub async fn delete(&self, caller: UserId, object_id: ObjectId) -> SyncResult<()> {
        let (placed, scene) = self.load_with_scene(object_id).await?;
        self.gate
            .require_master_or_owner(caller, scene.table_id, object_id)
            .await?;

        self.placed_repo.delete(object_id).await?;

        info!(object_id, scene_id = placed.scene_id, "[PlacedObjectAppService] Deleted object");

        self.publisher.publish(SyncEvent::for_scene(
            placed.scene_id,
            SyncAction::placed_deleted(placed.kind, object_id, placed.scene_id),
        ));

        Ok(())
    }

    /// Move an object to a new position (master or owner)
    ///
    /// Publishes: `PlacedTokenMoved` or `PlacedImageMoved`
    pub async fn move_to(
        &self,
        caller: UserId,
        object_id: ObjectId,
        pos_x: i32,
        pos_y: i32,
    ) -> SyncResult<PlacedObject> {
        let (mut placed, scene) = self.load_with_scene(object_id).await?;
        self.gate
            .require_master_or_owner(caller, scene.table_id, object_id)
            .await?;

        self.placed_repo.move_to(object_id, pos_x, pos_y).await?;
        placed.pos_x = pos_x;
        placed.pos_y = pos_y;

        info!(
            object_id,
            scene_id = placed.scene_id,
            pos_x,
            pos_y,
            "[PlacedObjectAppService] Moved object"
        );

        self.publisher.publish(SyncEvent::for_scene(
            placed.scene_id,
            SyncAction::placed_moved(placed.kind, object_id, placed.scene_id, pos_x, pos_y),
        ));

        Ok(placed)
    }

    async fn load_scene(&self, scene_id: SceneId) -> SyncResult<Scene> {
        if scene_id == 0 {
            return Err(SyncError::invalid("scene id is required"));
        }
        self.scene_repo
            .get(scene_id)
            .await?
            .ok_or_else(|| SyncError::not_found("scene not found"))
    }

    /// Load a placed object together with the scene it sits on
    async fn load_with_scene(
        &self,
        object_id: ObjectId,
    ) -> SyncResult<(PlacedObject, Scene)> {
        if object_id == 0 {
            return Err(SyncError::invalid("object id is required"));
        }
        let placed = self
            .placed_repo
            .get(object_id)
            .await?
            .ok_or_else(|| SyncError::not_found("placed object not found"))?;
        let scene = self.load_scene(placed.scene_id).await?;
        Ok((placed, scene))
    }
}
