//! Table membership - who sits at a table and with which role

use serde::{Deserialize, Serialize};

use super::{TableId, UserId};

/// Role of a user within a table
///
/// Stored as an integer (`Player = 1`, `Master = 2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Player,
    Master,
}

impl Role {
    pub fn as_i64(&self) -> i64 {
        match self {
            Role::Player => 1,
            Role::Master => 2,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(Role::Player),
            2 => Some(Role::Master),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Player => "player",
            Role::Master => "master",
        }
    }
}

/// Membership of a user in a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMember {
    pub table_id: TableId,
    pub user_id: UserId,
    pub role: Role,
}

impl TableMember {
    pub fn new(table_id: TableId, user_id: UserId, role: Role) -> Self {
        Self {
            table_id,
            user_id,
            role,
        }
    }

    pub fn is_master(&self) -> bool {
        self.role == Role::Master
    }
}
