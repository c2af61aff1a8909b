//! SQLite connection and schema management
//!
//! One [`Database`] wraps one `rusqlite::Connection`. Repositories share it
//! behind `Arc<tokio::sync::Mutex<Database>>`, so every statement runs on the
//! same connection and writes are serialized by the mutex.
//!
//! ## Schema versions
//!
//! Schema files live in `migrations/NNN_name.sql` and are listed in
//! [`MIGRATIONS`] in ascending order. Opening a database applies every file
//! whose version is above the highest row in `schema_migrations`, each inside
//! its own transaction together with its bookkeeping row.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// How long a statement waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial",
    sql: include_str!("migrations/001_initial.sql"),
}];

/// Open SQLite database with the tabletop schema applied
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file at `path`, creating parent
    /// directories as needed, and bring the schema up to date.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory {:?}", parent))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {:?}", path))?;
        // Readers keep going while a mutation commits
        conn.pragma_update(None, "journal_mode", "WAL")?;

        debug!("[Database] Opened {:?}", path);
        Self::initialize(conn)
    }

    /// Private in-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        debug!("[Database] Opened in-memory database");
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL
            )",
        )?;

        let current = self.schema_version()?;
        let pending: Vec<&Migration> = MIGRATIONS
            .iter()
            .filter(|migration| migration.version > current)
            .collect();

        if pending.is_empty() {
            debug!("[Database] Schema is current at version {}", current);
            return Ok(());
        }

        for migration in pending {
            info!(
                "[Database] Applying migration {:03}_{}",
                migration.version, migration.name
            );

            self.transaction(|conn| {
                conn.execute_batch(migration.sql).with_context(|| {
                    format!(
                        "Migration {:03}_{} failed",
                        migration.version, migration.name
                    )
                })?;
                conn.execute(
                    "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
                    params![
                        migration.version,
                        migration.name,
                        chrono::Utc::now().to_rfc3339()
                    ],
                )?;
                Ok(())
            })?;
        }

        info!("[Database] Schema at version {}", self.schema_version()?);
        Ok(())
    }

    /// Highest applied schema version, 0 before any migration ran.
    pub fn schema_version(&self) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )?)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside a transaction; any error rolls everything back.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let tx = self.conn.unchecked_transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }
}
