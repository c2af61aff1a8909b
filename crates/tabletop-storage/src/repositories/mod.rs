//! Repository implementations using SQLite.

mod chat_repository;
mod library_repository;
mod membership_repository;
mod owner_repository;
mod placed_object_repository;
mod scene_repository;

pub use chat_repository::SqliteChatRepository;
pub use library_repository::SqliteLibraryRepository;
pub use membership_repository::SqliteMembershipRepository;
pub use owner_repository::SqliteObjectOwnerRepository;
pub use placed_object_repository::SqlitePlacedObjectRepository;
pub use scene_repository::SqliteSceneRepository;

use chrono::{DateTime, Utc};
use tabletop_core::ObjectKind;

pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Parse a stored timestamp.
/// Handles both RFC3339 and SQLite's `datetime('now')` format.
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return dt.and_utc();
    }

    Utc::now()
}

/// Map a stored `kind` column back to an ObjectKind, failing the row on garbage.
pub(crate) fn parse_kind(value: String, column: usize) -> rusqlite::Result<ObjectKind> {
    ObjectKind::parse(&value).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            rusqlite::types::Type::Text,
            format!("unknown object kind '{}'", value).into(),
        )
    })
}
