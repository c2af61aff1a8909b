//! Shared test utilities and fixtures for Tabletop integration tests.

pub use tabletop_core::{
    ObjectKind, PermissionLevel, Role, SceneId, SyncAction, SyncEvent, TableId, Topic, UserId,
};

/// Mock repository implementations
pub mod mocks;
pub use mocks::MockRepositories;

pub use transport::{channel_transport, ChannelTransport, ServerFrame, TestClient};

/// Event testing utilities
pub mod events {
    use std::time::Duration;
    use tabletop_core::{Inbox, SyncEvent};

    /// Collect events from an inbox until it stays quiet for `timeout`
    pub async fn collect_events(rx: &mut Inbox<SyncEvent>, timeout: Duration) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        while let Ok(Some(event)) = tokio::time::timeout(timeout, rx.recv()).await {
            events.push((*event).clone());
        }
        events
    }

    /// Drain whatever is already queued without waiting
    pub fn drain(rx: &mut Inbox<SyncEvent>) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push((*event).clone());
        }
        events
    }
}

/// Test fixture utilities
///
/// The standard table used across tests:
///
/// | id  | what                                            |
/// |-----|-------------------------------------------------|
/// | 1   | table, owned by master 10                       |
/// | 2   | second table, owned by 40 (10 is only a player) |
/// | 7   | scene "Forest" in table 1                       |
/// | 8   | scene "Castle" in table 1                       |
/// | 100 | library token "Goblin" in table 1               |
/// | 101 | library image "Map" in table 1                  |
/// | 500 | placed token on scene 7, owned by player 20     |
/// | 501 | placed image on scene 7, no owners              |
pub mod fixtures {
    use super::*;
    use tabletop_core::{LibraryObject, PlacedObject, Scene};

    pub const TABLE: TableId = 1;
    pub const OTHER_TABLE: TableId = 2;
    pub const FOREST: SceneId = 7;
    pub const CASTLE: SceneId = 8;
    pub const GOBLIN: u64 = 100;
    pub const MAP: u64 = 101;
    pub const PLACED_TOKEN: u64 = 500;
    pub const PLACED_IMAGE: u64 = 501;

    pub const MASTER: UserId = 10;
    pub const PLAYER: UserId = 20;
    pub const OUTSIDER: UserId = 30;
    pub const OTHER_MASTER: UserId = 40;

    /// Populate mocks with the standard table
    pub fn standard_table() -> MockRepositories {
        let repos = MockRepositories::new();

        repos.members.add_table(TABLE, MASTER);
        repos.members.add_member(TABLE, PLAYER, Role::Player);
        repos.members.add_table(OTHER_TABLE, OTHER_MASTER);
        repos.members.add_member(OTHER_TABLE, MASTER, Role::Player);

        repos.scenes.insert(Scene::new(TABLE, "Forest", 40, 30), FOREST);
        repos.scenes.insert(Scene::new(TABLE, "Castle", 20, 20), CASTLE);

        repos.library.insert(
            LibraryObject::new(TABLE, ObjectKind::Token, "Goblin", "goblin.png"),
            GOBLIN,
        );
        repos
            .library
            .insert(LibraryObject::new(TABLE, ObjectKind::Image, "Map", "map.png"), MAP);

        repos.placed.insert(
            PlacedObject::new(FOREST, GOBLIN, ObjectKind::Token).at(5, 5),
            PLACED_TOKEN,
        );
        repos.placed.insert(
            PlacedObject::new(FOREST, MAP, ObjectKind::Image),
            PLACED_IMAGE,
        );
        repos.owners.grant(PLACED_TOKEN, PLAYER);

        repos
    }
}

/// Database test helpers
pub mod db {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tabletop_storage::Database;
    use tempfile::TempDir;
    use tokio::sync::Mutex;

    /// Scratch directory plus a database file inside it. The directory
    /// outlives every handle opened through [`ScratchDatabase::open`].
    pub struct ScratchDatabase {
        dir: TempDir,
    }

    impl ScratchDatabase {
        pub fn new() -> Self {
            Self {
                dir: TempDir::new().expect("Failed to create temp dir"),
            }
        }

        pub fn dir(&self) -> &Path {
            self.dir.path()
        }

        pub fn file(&self) -> PathBuf {
            self.dir.path().join("tabletop.db")
        }

        /// Open (or reopen) the database file
        pub fn open(&self) -> Database {
            Database::open(&self.file()).expect("Failed to open scratch database")
        }
    }

    impl Default for ScratchDatabase {
        fn default() -> Self {
            Self::new()
        }
    }

    pub fn in_memory() -> Database {
        Database::open_in_memory().expect("Failed to open in-memory database")
    }

    /// Shared in-memory database, ready to hand to repositories
    pub fn shared_in_memory() -> Arc<Mutex<Database>> {
        Arc::new(Mutex::new(in_memory()))
    }
}

/// Async test helpers
pub mod async_helpers {
    use std::time::Duration;
    use tokio::time::timeout;

    /// Run an async operation with a timeout
    pub async fn with_timeout<F, T>(duration: Duration, f: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        timeout(duration, f).await.expect("Operation timed out")
    }

    /// Poll `condition` until it holds or `duration` elapses
    pub async fn wait_until<F>(duration: Duration, condition: F) -> bool
    where
        F: Fn() -> bool,
    {
        let deadline = tokio::time::Instant::now() + duration;
        while tokio::time::Instant::now() < deadline {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        condition()
    }

    /// Default test timeout (5 seconds)
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// How long to wait before concluding nothing will arrive
    pub const QUIET_PERIOD: Duration = Duration::from_millis(100);
}
