//! Sync Events - notifications of committed changes
//!
//! Every state change that other clients must see is described by one
//! [`SyncAction`] variant, wrapped in a [`SyncEvent`] carrying the scope ids
//! used for routing. Events are built by the mutation services after the
//! change is committed and relayed verbatim to streaming clients.
//!
//! # Routing
//!
//! - `scene_id != 0` → the event goes to `scene:<scene_id>`
//! - otherwise → the event goes to `table:<table_id>`
//!
//! # Design Principles
//!
//! - **Closed**: one variant per mutation kind, matched exhaustively
//! - **Immutable**: events are facts that happened, never mutated
//! - **Serializable**: JSON with an internally tagged `action`

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    ChatMessage, LibraryObject, ObjectId, ObjectKind, PermissionLevel, PlacedObject, Role,
    Scene, SceneId, TableId, UserId,
};
use crate::topic::Topic;

/// Envelope of a sync notification
///
/// At most one of the scope ids is meaningful; the other is `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncEvent {
    #[serde(default)]
    pub table_id: TableId,
    #[serde(default)]
    pub scene_id: SceneId,
    pub action: SyncAction,
}

impl SyncEvent {
    /// Event routed to the table topic
    pub fn for_table(table_id: TableId, action: SyncAction) -> Self {
        Self {
            table_id,
            scene_id: 0,
            action,
        }
    }

    /// Event routed to the scene topic
    pub fn for_scene(scene_id: SceneId, action: SyncAction) -> Self {
        Self {
            table_id: 0,
            scene_id,
            action,
        }
    }

    /// Topic this event is published on
    pub fn topic(&self) -> Topic {
        if self.scene_id != 0 {
            Topic::scene(self.scene_id)
        } else {
            Topic::table(self.table_id)
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.action.type_name()
    }
}

/// What changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncAction {
    // ------------------------------------------------------------------------
    // Scenes (table topic)
    // ------------------------------------------------------------------------
    SceneCreated {
        scene: Scene,
    },
    SceneUpdated {
        scene: Scene,
    },
    SceneDeleted {
        scene_id: SceneId,
    },

    // ------------------------------------------------------------------------
    // Library tokens and images (table topic)
    // ------------------------------------------------------------------------
    TokenCreated {
        token: LibraryObject,
    },
    TokenUpdated {
        token: LibraryObject,
    },
    TokenDeleted {
        token_id: ObjectId,
        table_id: TableId,
    },
    ImageUploaded {
        image: LibraryObject,
    },
    ImageUpdated {
        image: LibraryObject,
    },
    ImageDeleted {
        image_id: ObjectId,
        table_id: TableId,
    },

    // ------------------------------------------------------------------------
    // Placed tokens and images (scene topic)
    // ------------------------------------------------------------------------
    PlacedTokenCreated {
        placed_token: PlacedObject,
    },
    PlacedTokenUpdated {
        placed_token: PlacedObject,
    },
    PlacedTokenDeleted {
        placed_token_id: ObjectId,
        scene_id: SceneId,
    },
    PlacedTokenMoved {
        placed_token_id: ObjectId,
        scene_id: SceneId,
        pos_x: i32,
        pos_y: i32,
    },
    PlacedImageCreated {
        placed_image: PlacedObject,
    },
    PlacedImageUpdated {
        placed_image: PlacedObject,
    },
    PlacedImageDeleted {
        placed_image_id: ObjectId,
        scene_id: SceneId,
    },
    PlacedImageMoved {
        placed_image_id: ObjectId,
        scene_id: SceneId,
        pos_x: i32,
        pos_y: i32,
    },

    // ------------------------------------------------------------------------
    // Chat (table topic)
    // ------------------------------------------------------------------------
    MessageSent {
        message: ChatMessage,
    },
    MessageUpdated {
        message: ChatMessage,
    },
    MessageDeleted {
        message_id: Uuid,
        table_id: TableId,
    },

    // ------------------------------------------------------------------------
    // Membership and permissions
    // ------------------------------------------------------------------------
    /// A member was promoted to master or demoted to player (table topic)
    MemberRoleChanged {
        table_id: TableId,
        user_id: UserId,
        role: Role,
    },
    /// Owners or access levels of a placed object changed (scene topic)
    PlacedObjectAccessUpdated {
        object_id: ObjectId,
        object_kind: ObjectKind,
        owner_user_ids: Vec<UserId>,
        can_be_viewed_by: PermissionLevel,
        can_be_modified_by: PermissionLevel,
    },
    /// Library visibility of a token or image changed (table topic)
    LibraryObjectVisibilityUpdated {
        object_id: ObjectId,
        object_kind: ObjectKind,
        visibility: PermissionLevel,
    },
}

impl SyncAction {
    /// Get the action type name for logging
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SceneCreated { .. } => "scene_created",
            Self::SceneUpdated { .. } => "scene_updated",
            Self::SceneDeleted { .. } => "scene_deleted",
            Self::TokenCreated { .. } => "token_created",
            Self::TokenUpdated { .. } => "token_updated",
            Self::TokenDeleted { .. } => "token_deleted",
            Self::ImageUploaded { .. } => "image_uploaded",
            Self::ImageUpdated { .. } => "image_updated",
            Self::ImageDeleted { .. } => "image_deleted",
            Self::PlacedTokenCreated { .. } => "placed_token_created",
            Self::PlacedTokenUpdated { .. } => "placed_token_updated",
            Self::PlacedTokenDeleted { .. } => "placed_token_deleted",
            Self::PlacedTokenMoved { .. } => "placed_token_moved",
            Self::PlacedImageCreated { .. } => "placed_image_created",
            Self::PlacedImageUpdated { .. } => "placed_image_updated",
            Self::PlacedImageDeleted { .. } => "placed_image_deleted",
            Self::PlacedImageMoved { .. } => "placed_image_moved",
            Self::MessageSent { .. } => "message_sent",
            Self::MessageUpdated { .. } => "message_updated",
            Self::MessageDeleted { .. } => "message_deleted",
            Self::MemberRoleChanged { .. } => "member_role_changed",
            Self::PlacedObjectAccessUpdated { .. } => "placed_object_access_updated",
            Self::LibraryObjectVisibilityUpdated { .. } => "library_object_visibility_updated",
        }
    }

    pub fn library_created(object: LibraryObject) -> Self {
        match object.kind {
            ObjectKind::Token => Self::TokenCreated { token: object },
            ObjectKind::Image => Self::ImageUploaded { image: object },
        }
    }

    pub fn library_updated(object: LibraryObject) -> Self {
        match object.kind {
            ObjectKind::Token => Self::TokenUpdated { token: object },
            ObjectKind::Image => Self::ImageUpdated { image: object },
        }
    }

    pub fn library_deleted(kind: ObjectKind, object_id: ObjectId, table_id: TableId) -> Self {
        match kind {
            ObjectKind::Token => Self::TokenDeleted {
                token_id: object_id,
                table_id,
            },
            ObjectKind::Image => Self::ImageDeleted {
                image_id: object_id,
                table_id,
            },
        }
    }

    pub fn placed_created(object: PlacedObject) -> Self {
        match object.kind {
            ObjectKind::Token => Self::PlacedTokenCreated {
                placed_token: object,
            },
            ObjectKind::Image => Self::PlacedImageCreated {
                placed_image: object,
            },
        }
    }

    pub fn placed_updated(object: PlacedObject) -> Self {
        match object.kind {
            ObjectKind::Token => Self::PlacedTokenUpdated {
                placed_token: object,
            },
            ObjectKind::Image => Self::PlacedImageUpdated {
                placed_image: object,
            },
        }
    }

    pub fn placed_deleted(kind: ObjectKind, object_id: ObjectId, scene_id: SceneId) -> Self {
        match kind {
            ObjectKind::Token => Self::PlacedTokenDeleted {
                placed_token_id: object_id,
                scene_id,
            },
            ObjectKind::Image => Self::PlacedImageDeleted {
                placed_image_id: object_id,
                scene_id,
            },
        }
    }

    pub fn placed_moved(
        kind: ObjectKind,
        object_id: ObjectId,
        scene_id: SceneId,
        pos_x: i32,
        pos_y: i32,
    ) -> Self {
        match kind {
            ObjectKind::Token => Self::PlacedTokenMoved {
                placed_token_id: object_id,
                scene_id,
                pos_x,
                pos_y,
            },
            ObjectKind::Image => Self::PlacedImageMoved {
                placed_image_id: object_id,
                scene_id,
                pos_x,
                pos_y,
            },
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
