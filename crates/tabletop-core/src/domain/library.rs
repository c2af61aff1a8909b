//! Library objects - tokens and images owned by a table, ready to be placed

use serde::{Deserialize, Serialize};

use super::{ObjectId, ObjectKind, PermissionLevel, TableId};

/// A token or image stored in a table's library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryObject {
    /// Unique identifier (0 until persisted)
    pub id: ObjectId,

    /// Owning table
    pub table_id: TableId,

    pub kind: ObjectKind,

    /// Display name
    pub name: String,

    /// Location of the already-uploaded artwork
    pub image_url: String,

    /// Who can see this object in the library
    pub visibility: PermissionLevel,
}

impl LibraryObject {
    pub fn new(
        table_id: TableId,
        kind: ObjectKind,
        name: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            table_id,
            kind,
            name: name.into(),
            image_url: image_url.into(),
            visibility: PermissionLevel::Master,
        }
    }
}

/// Request to add an object to the library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLibraryObject {
    pub kind: ObjectKind,
    pub name: String,
    pub image_url: String,
    pub visibility: Option<PermissionLevel>,
}

/// Partial update of a library object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryObjectUpdate {
    pub name: Option<String>,
    pub image_url: Option<String>,
}
