//! Repository traits for data access
//!
//! These traits define the interface for data storage without specifying
//! the implementation (SQLite, in-memory, etc.)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    ChatMessage, LibraryObject, ObjectId, PermissionLevel, PlacedObject, Role, Scene, SceneId,
    TableId, TableMember, UserId,
};

/// Result type for repository operations
pub type RepoResult<T> = anyhow::Result<T>;

/// Table membership repository trait
///
/// Soft-deleted memberships are invisible to every method.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Get a user's membership in a table
    async fn get_member(&self, table_id: TableId, user_id: UserId)
        -> RepoResult<Option<TableMember>>;

    /// Whether the user holds `role` in the table
    async fn has_role(&self, table_id: TableId, user_id: UserId, role: Role) -> RepoResult<bool>;

    /// Change a member's role
    async fn update_role(&self, table_id: TableId, user_id: UserId, role: Role)
        -> RepoResult<()>;

    /// User who created the table, if the table exists
    async fn table_owner(&self, table_id: TableId) -> RepoResult<Option<UserId>>;
}

/// Placed object ownership repository trait
#[async_trait]
pub trait ObjectOwnerRepository: Send + Sync {
    /// Whether the user is a (not soft-deleted) owner of the placed object
    async fn is_owner(&self, user_id: UserId, object_id: ObjectId) -> RepoResult<bool>;

    /// Current owners of a placed object
    async fn list_owners(&self, object_id: ObjectId) -> RepoResult<Vec<UserId>>;
}

/// Scene repository trait
#[async_trait]
pub trait SceneRepository: Send + Sync {
    async fn get(&self, id: SceneId) -> RepoResult<Option<Scene>>;

    /// Persist a new scene and return its id
    async fn create(&self, scene: &Scene) -> RepoResult<SceneId>;

    async fn update(&self, scene: &Scene) -> RepoResult<()>;

    async fn delete(&self, id: SceneId) -> RepoResult<()>;
}

/// Library (tokens and images) repository trait
#[async_trait]
pub trait LibraryRepository: Send + Sync {
    async fn get(&self, id: ObjectId) -> RepoResult<Option<LibraryObject>>;

    /// Persist a new library object and return its id
    async fn create(&self, object: &LibraryObject) -> RepoResult<ObjectId>;

    async fn update(&self, object: &LibraryObject) -> RepoResult<()>;

    async fn delete(&self, id: ObjectId) -> RepoResult<()>;

    async fn set_visibility(&self, id: ObjectId, visibility: PermissionLevel) -> RepoResult<()>;
}

/// Placed object repository trait
#[async_trait]
pub trait PlacedObjectRepository: Send + Sync {
    async fn get(&self, id: ObjectId) -> RepoResult<Option<PlacedObject>>;

    /// Persist a new placement and return its id
    async fn create(&self, object: &PlacedObject) -> RepoResult<ObjectId>;

    async fn update(&self, object: &PlacedObject) -> RepoResult<()>;

    async fn delete(&self, id: ObjectId) -> RepoResult<()>;

    /// Update only the position
    async fn move_to(&self, id: ObjectId, pos_x: i32, pos_y: i32) -> RepoResult<()>;

    /// Replace the owners and the view/modify levels of a placed object.
    ///
    /// Either everything is stored or nothing is.
    async fn update_access(
        &self,
        id: ObjectId,
        owners: &[UserId],
        can_be_viewed_by: PermissionLevel,
        can_be_modified_by: PermissionLevel,
    ) -> RepoResult<()>;
}

/// Chat message repository trait
#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn get(&self, id: &Uuid) -> RepoResult<Option<ChatMessage>>;

    async fn create(&self, message: &ChatMessage) -> RepoResult<()>;

    async fn update(&self, message: &ChatMessage) -> RepoResult<()>;

    async fn delete(&self, id: &Uuid) -> RepoResult<()>;
}
