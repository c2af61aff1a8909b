//! Placed objects - library tokens and images instantiated on a scene

use serde::{Deserialize, Serialize};

use super::{ObjectId, ObjectKind, SceneId, UserId};

/// Who may see or modify an object
///
/// Stored as an integer: `None = 0`, `Master = 1`, `OwnerAndMaster = 2`,
/// `AllPlayers = 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    None,
    Master,
    OwnerAndMaster,
    AllPlayers,
}

impl PermissionLevel {
    pub fn as_i64(&self) -> i64 {
        match self {
            PermissionLevel::None => 0,
            PermissionLevel::Master => 1,
            PermissionLevel::OwnerAndMaster => 2,
            PermissionLevel::AllPlayers => 3,
        }
    }

    /// Unknown values collapse to `None`
    pub fn from_i64(value: i64) -> Self {
        match value {
            1 => PermissionLevel::Master,
            2 => PermissionLevel::OwnerAndMaster,
            3 => PermissionLevel::AllPlayers,
            _ => PermissionLevel::None,
        }
    }
}

/// Drawing layer of a placed object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerType {
    Map,
    Player,
    Master,
}

impl LayerType {
    pub fn as_i64(&self) -> i64 {
        match self {
            LayerType::Map => 1,
            LayerType::Player => 2,
            LayerType::Master => 3,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(LayerType::Map),
            2 => Some(LayerType::Player),
            3 => Some(LayerType::Master),
            _ => None,
        }
    }
}

impl Default for LayerType {
    fn default() -> Self {
        LayerType::Player
    }
}

/// A token or image placed on a scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedObject {
    /// Unique identifier (0 until persisted)
    pub id: ObjectId,

    /// Scene the object sits on
    pub scene_id: SceneId,

    /// Library object this was placed from
    pub library_id: ObjectId,

    pub kind: ObjectKind,

    pub pos_x: i32,
    pub pos_y: i32,
    pub width: i32,
    pub height: i32,
    pub layer: LayerType,

    /// Rotation in degrees
    pub rotation: i32,

    pub can_be_viewed_by: PermissionLevel,
    pub can_be_modified_by: PermissionLevel,
}

impl PlacedObject {
    /// New placement with default visibility (everyone) and edit rights (owners and master)
    pub fn new(scene_id: SceneId, library_id: ObjectId, kind: ObjectKind) -> Self {
        Self {
            id: 0,
            scene_id,
            library_id,
            kind,
            pos_x: 0,
            pos_y: 0,
            width: 1,
            height: 1,
            layer: LayerType::default(),
            rotation: 0,
            can_be_viewed_by: PermissionLevel::AllPlayers,
            can_be_modified_by: PermissionLevel::OwnerAndMaster,
        }
    }

    pub fn at(mut self, pos_x: i32, pos_y: i32) -> Self {
        self.pos_x = pos_x;
        self.pos_y = pos_y;
        self
    }
}

/// Request to place a library object on a scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceObject {
    pub library_id: ObjectId,
    #[serde(default)]
    pub pos_x: i32,
    #[serde(default)]
    pub pos_y: i32,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub layer: Option<LayerType>,
}

/// Partial update of a placed object's presentation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlacedObjectUpdate {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub layer: Option<LayerType>,
    pub rotation: Option<i32>,
}

/// Replacement of a placed object's owners and access levels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessUpdate {
    #[serde(default)]
    pub owner_user_ids: Vec<UserId>,
    pub can_be_viewed_by: Option<PermissionLevel>,
    pub can_be_modified_by: Option<PermissionLevel>,
}
