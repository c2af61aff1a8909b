//! Library Application Service
//!
//! Manages a table's library of tokens and images. Artwork is uploaded
//! elsewhere; this service only records metadata and announces changes.

use std::sync::Arc;
use tracing::info;

use crate::broker::EventPublisher;
use crate::domain::{
    LibraryObject, LibraryObjectUpdate, NewLibraryObject, ObjectId, PermissionLevel, SyncAction,
    SyncEvent, TableId, UserId,
};
use crate::error::{SyncError, SyncResult};
use crate::repository::LibraryRepository;
use crate::service::AuthorizationGate;

/// Application service for library tokens and images
pub struct LibraryAppService {
    library_repo: Arc<dyn LibraryRepository>,
    gate: Arc<AuthorizationGate>,
    publisher: EventPublisher,
}

impl LibraryAppService {
    pub fn new(
        library_repo: Arc<dyn LibraryRepository>,
        gate: Arc<AuthorizationGate>,
        publisher: EventPublisher,
    ) -> Self {
        Self {
            library_repo,
            gate,
            publisher,
        }
    }

    pub async fn get(&self, id: ObjectId) -> SyncResult<Option<LibraryObject>> {
        Ok(self.library_repo.get(id).await?)
    }

    /// Add a token or image to the library (master only)
    ///
    /// Publishes: `TokenCreated` or `ImageUploaded`
    pub async fn create(
        &self,
        caller: UserId,
        table_id: TableId,
        draft: NewLibraryObject,
    ) -> SyncResult<LibraryObject> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(SyncError::invalid("name is required"));
        }
        if draft.image_url.trim().is_empty() {
            return Err(SyncError::invalid("image url is required"));
        }

        if draft.visibility == Some(PermissionLevel::None) {
            return Err(SyncError::invalid("invalid visibility"));
        }

        self.gate.require_master(caller, table_id).await?;

        let mut object = LibraryObject::new(table_id, draft.kind, name, draft.image_url.trim());
        if let Some(visibility) = draft.visibility {
            object.visibility = visibility;
        }
        object.id = self.library_repo.create(&object).await?;

        info!(
            object_id = object.id,
            table_id,
            kind = object.kind.as_str(),
            "[LibraryAppService] Created library object"
        );

        self.publisher.publish(SyncEvent::for_table(
            table_id,
            SyncAction::library_created(object.clone()),
        ));

        Ok(object)
    }

    /// Update a library object (master only)
    ///
    /// Publishes: `TokenUpdated` or `ImageUpdated`
    pub async fn update(
        &self,
        caller: UserId,
        object_id: ObjectId,
        changes: LibraryObjectUpdate,
    ) -> SyncResult<LibraryObject> {
        let mut object = self.load(object_id).await?;
        self.gate.require_master(caller, object.table_id).await?;

        if let Some(name) = changes.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(SyncError::invalid("name cannot be empty"));
            }
            object.name = name.to_string();
        }
        if let Some(image_url) = changes.image_url {
            if image_url.trim().is_empty() {
                return Err(SyncError::invalid("image url cannot be empty"));
            }
            object.image_url = image_url.trim().to_string();
        }

        self.library_repo.update(&object).await?;

        info!(object_id, "[LibraryAppService] Updated library object");

        self.publisher.publish(SyncEvent::for_table(
            object.table_id,
            SyncAction::library_updated(object.clone()),
        ));

        Ok(object)
    }

    /// Remove a library object (master only)
    ///
    /// Publishes: `TokenDeleted` or `ImageDeleted`
    pub async fn delete(&self, caller: UserId, object_id: ObjectId) -> SyncResult<()> {
        let object = self.load(object_id).await?;
        self.gate.require_master(caller, object.table_id).await?;

        self.library_repo.delete(object_id).await?;

        info!(object_id, table_id = object.table_id, "[LibraryAppService] Deleted library object");

        self.publisher.publish(SyncEvent::for_table(
            object.table_id,
            SyncAction::library_deleted(object.kind, object_id, object.table_id),
        ));

        Ok(())
    }

    async fn load(&self, object_id: ObjectId) -> SyncResult<LibraryObject> {
        if object_id == 0 {
            return Err(SyncError::invalid("object id is required"));
        }
        self.library_repo
            .get(object_id)
            .await?
            .ok_or_else(|| SyncError::not_found("library object not found"))
    }
}
