//! Permission Application Service
//!
//! Master-only changes to who owns, sees and modifies objects.

use std::sync::Arc;
use tracing::{info, warn};

use crate::broker::EventPublisher;
use crate::domain::{
    AccessUpdate, LibraryObject, ObjectId, PermissionLevel, PlacedObject, SyncAction, SyncEvent,
    UserId,
};
use crate::error::{SyncError, SyncResult};
use crate::repository::{
    LibraryRepository, ObjectOwnerRepository, PlacedObjectRepository, SceneRepository,
};
use crate::service::AuthorizationGate;

/// Application service for object ownership and visibility
pub struct PermissionAppService {
    placed_repo: Arc<dyn PlacedObjectRepository>,
    scene_repo: Arc<dyn SceneRepository>,
    library_repo: Arc<dyn LibraryRepository>,
    owner_repo: Arc<dyn ObjectOwnerRepository>,
    gate: Arc<AuthorizationGate>,
    publisher: EventPublisher,
}

impl PermissionAppService {
    pub fn new(
        placed_repo: Arc<dyn PlacedObjectRepository>,
        scene_repo: Arc<dyn SceneRepository>,
        library_repo: Arc<dyn LibraryRepository>,
        owner_repo: Arc<dyn ObjectOwnerRepository>,
        gate: Arc<AuthorizationGate>,
        publisher: EventPublisher,
    ) -> Self {
        Self {
            placed_repo,
            scene_repo,
            library_repo,
            owner_repo,
            gate,
            publisher,
        }
    }

    /// Current owners of a placed object
    pub async fn owners(&self, object_id: ObjectId) -> SyncResult<Vec<UserId>> {
        Ok(self.owner_repo.list_owners(object_id).await?)
    }

    /// Replace the owners of a placed object and optionally its view/modify
    /// levels (master only)
    ///
    /// The owner list is deduplicated and zero ids are discarded.
    ///
    /// Publishes: `PlacedObjectAccessUpdated` on the object's scene
    pub async fn update_access(
        &self,
        caller: UserId,
        object_id: ObjectId,
        update: AccessUpdate,
    ) -> SyncResult<PlacedObject> {
        if object_id == 0 {
            return Err(SyncError::invalid("object id is required"));
        }

        let mut placed = self
            .placed_repo
            .get(object_id)
            .await?
            .ok_or_else(|| SyncError::not_found("placed object not found"))?;
        let scene = self
            .scene_repo
            .get(placed.scene_id)
            .await?
            .ok_or_else(|| SyncError::not_found("scene not found"))?;

        self.gate.require_master(caller, scene.table_id).await?;

        let owners = clean_owner_ids(&update.owner_user_ids);
        if let Some(level) = update.can_be_viewed_by {
            placed.can_be_viewed_by = level;
        }
        if let Some(level) = update.can_be_modified_by {
            placed.can_be_modified_by = level;
        }
        self.placed_repo
            .update_access(
                object_id,
                &owners,
                placed.can_be_viewed_by,
                placed.can_be_modified_by,
            )
            .await?;

        // Announce what is actually stored
        let owner_user_ids = match self.owner_repo.list_owners(object_id).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(
                    object_id,
                    error = %e,
                    "[PermissionAppService] Failed to reload owners for event"
                );
                owners
            }
        };

        info!(
            object_id,
            scene_id = placed.scene_id,
            owners = owner_user_ids.len(),
            "[PermissionAppService] Updated placed object access"
        );

        self.publisher.publish(SyncEvent::for_scene(
            placed.scene_id,
            SyncAction::PlacedObjectAccessUpdated {
                object_id,
                object_kind: placed.kind,
                owner_user_ids,
                can_be_viewed_by: placed.can_be_viewed_by,
                can_be_modified_by: placed.can_be_modified_by,
            },
        ));

        Ok(placed)
    }

    /// Change who can see a library object (master only)
    ///
    /// Publishes: `LibraryObjectVisibilityUpdated` on the table
    pub async fn update_library_visibility(
        &self,
        caller: UserId,
        object_id: ObjectId,
        visibility: PermissionLevel,
    ) -> SyncResult<LibraryObject> {
        if object_id == 0 {
            return Err(SyncError::invalid("object id is required"));
        }
        if visibility == PermissionLevel::None {
            return Err(SyncError::invalid("invalid visibility"));
        }

        let mut object = self
            .library_repo
            .get(object_id)
            .await?
            .ok_or_else(|| SyncError::not_found("library object not found"))?;

        self.gate.require_master(caller, object.table_id).await?;

        self.library_repo.set_visibility(object_id, visibility).await?;
        object.visibility = visibility;

        info!(
            object_id,
            table_id = object.table_id,
            "[PermissionAppService] Updated library visibility"
        );

        self.publisher.publish(SyncEvent::for_table(
            object.table_id,
            SyncAction::LibraryObjectVisibilityUpdated {
                object_id,
                object_kind: object.kind,
                visibility,
            },
        ));

        Ok(object)
    }
}

/// Deduplicate while keeping first-seen order, dropping zero ids
fn clean_owner_ids(ids: &[UserId]) -> Vec<UserId> {
    let mut cleaned = Vec::with_capacity(ids.len());
    for &id in ids {
        if id != 0 && !cleaned.contains(&id) {
            cleaned.push(id);
        }
    }
    cleaned
}
