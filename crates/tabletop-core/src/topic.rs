//! Topic addressing
//!
//! Every broadcast channel is scoped to exactly one table or one scene.
//! A topic's canonical key is `"<kind>:<id>"`, e.g. `table:42` or `scene:7`.
//! Keys are only ever produced, never parsed back.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of scope a topic belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Table,
    Scene,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Table => "table",
            ScopeKind::Scene => "scene",
        }
    }
}

/// Addressable broadcast channel scoped to a table or a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topic {
    pub kind: ScopeKind,
    pub id: u64,
}

impl Topic {
    pub fn new(kind: ScopeKind, id: u64) -> Self {
        Self { kind, id }
    }

    /// Topic carrying table-wide changes (scenes, library, chat, members)
    pub fn table(id: u64) -> Self {
        Self::new(ScopeKind::Table, id)
    }

    /// Topic carrying changes to objects placed on one scene
    pub fn scene(id: u64) -> Self {
        Self::new(ScopeKind::Scene, id)
    }

    /// Canonical string key used by the broker
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind.as_str(), self.id)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}
