//! SQLite persistence for the tabletop
//!
//! Every repository trait from `tabletop-core` has a `Sqlite*` implementation
//! here. They all share one connection:
//!
//! ```text
//!   SqliteSceneRepository ─┐
//!   SqlitePlacedObject... ─┤
//!   SqliteMembership...   ─┼──> Arc<Mutex<Database>> ──> tabletop.db (WAL)
//!   SqliteChatRepository  ─┘         schema_migrations tracks the version
//! ```
//!
//! ```rust,ignore
//! let db = Arc::new(Mutex::new(Database::open(&default_database_path())?));
//! let scenes = SqliteSceneRepository::new(db.clone());
//! ```

mod database;
mod repositories;

use std::path::PathBuf;

pub use database::Database;
pub use repositories::{
    SqliteChatRepository, SqliteLibraryRepository, SqliteMembershipRepository,
    SqliteObjectOwnerRepository, SqlitePlacedObjectRepository, SqliteSceneRepository,
};

/// Default database file name
pub const DATABASE_FILE: &str = "tabletop.db";

/// Default location of the database: `<data dir>/tabletop/tabletop.db`.
///
/// Falls back to the working directory when the platform has no data dir.
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("tabletop"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATABASE_FILE)
}
