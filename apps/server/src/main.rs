//! Tabletop sync server
//!
//! Wires SQLite repositories, the event broker and the application services
//! into the gateway, then serves until Ctrl-C.

mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use tabletop_core::{create_shared_broker, ApplicationServicesBuilder};
use tabletop_gateway::GatewayServer;
use tabletop_storage::{
    Database, SqliteChatRepository, SqliteLibraryRepository, SqliteMembershipRepository,
    SqliteObjectOwnerRepository, SqlitePlacedObjectRepository, SqliteSceneRepository,
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use config::ServerConfig;

/// Log file prefix: `tabletop.2026-01-22.log`
const LOG_PREFIX: &str = "tabletop";

/// Initialize tracing with console and daily rolling file output
fn init_tracing() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let logs_dir = config::logs_dir();
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Failed to create logs directory {}", logs_dir.display()))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_PREFIX)
        .filename_suffix("log")
        .build(&logs_dir)
        .context("Failed to create log file appender")?;
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    // RUST_LOG takes precedence
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("info")
            .add_directive("tabletop_core=debug".parse()?)
            .add_directive("tabletop_gateway=debug".parse()?)
            .add_directive("tabletop_storage=debug".parse()?)
            .add_directive("tabletop_server=debug".parse()?)
            .add_directive("tower_http=info".parse()?),
    };

    let console_layer = fmt::layer()
        .with_ansi(true)
        .compact()
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    info!("Logging initialized. Log files: {}", logs_dir.display());

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let _guard = init_tracing()?;

    let config = ServerConfig::from_env()?;
    info!(
        database = %config.database_path.display(),
        capacity = config.gateway.subscriber_capacity,
        "[Server] Starting Tabletop v{}",
        env!("CARGO_PKG_VERSION")
    );

    let db = Database::open(&config.database_path)?;
    let db = Arc::new(Mutex::new(db));

    let services = ApplicationServicesBuilder::new()
        .with_broker(create_shared_broker(config.gateway.subscriber_capacity))
        .with_membership_repo(Arc::new(SqliteMembershipRepository::new(db.clone())))
        .with_owner_repo(Arc::new(SqliteObjectOwnerRepository::new(db.clone())))
        .with_scene_repo(Arc::new(SqliteSceneRepository::new(db.clone())))
        .with_library_repo(Arc::new(SqliteLibraryRepository::new(db.clone())))
        .with_placed_repo(Arc::new(SqlitePlacedObjectRepository::new(db.clone())))
        .with_chat_repo(Arc::new(SqliteChatRepository::new(db)))
        .build()?;

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("[Server] Failed to listen for Ctrl-C: {}", e);
                return;
            }
            info!("[Server] Ctrl-C received, shutting down");
            shutdown.cancel();
        });
    }

    let server = GatewayServer::new(config.gateway, services, shutdown);
    server.run().await
}
