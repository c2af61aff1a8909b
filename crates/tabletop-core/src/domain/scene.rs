//! Scene entity - a map or board within a table

use serde::{Deserialize, Serialize};

use super::{SceneId, TableId};

/// A scene holds placed tokens and images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// Unique identifier (0 until persisted)
    pub id: SceneId,

    /// Owning table
    pub table_id: TableId,

    /// Human-readable name
    pub name: String,

    /// Board width in grid units
    pub width: i32,

    /// Board height in grid units
    pub height: i32,
}

impl Scene {
    /// Create a new, not yet persisted scene
    pub fn new(table_id: TableId, name: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            id: 0,
            table_id,
            name: name.into(),
            width,
            height,
        }
    }
}

/// Partial update of a scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneUpdate {
    pub name: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
}
