//! Domain entities, value objects, and events
//!
//! This module contains all domain-level types for the tabletop:
//! - Entities (Scene, LibraryObject, PlacedObject, ChatMessage, TableMember)
//! - Value Objects (Role, PermissionLevel, LayerType, MessageType, ObjectKind)
//! - Sync Events (SyncEvent / SyncAction carried by the broker)

mod chat;
mod event;
mod library;
mod placed;
mod scene;
mod table;

pub use chat::*;
pub use event::{SyncAction, SyncEvent};
pub use library::*;
pub use placed::*;
pub use scene::*;
pub use table::*;

/// Identifier of a table (campaign)
pub type TableId = u64;
/// Identifier of a scene within a table
pub type SceneId = u64;
/// Identifier of a user account
pub type UserId = u64;
/// Identifier of a library or placed object
pub type ObjectId = u64;

/// Whether an object is a token or an image
///
/// Library objects and placed objects come in these two families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Token,
    Image,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Token => "token",
            ObjectKind::Image => "image",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "token" => Some(ObjectKind::Token),
            "image" => Some(ObjectKind::Image),
            _ => None,
        }
    }
}
