//! Gateway Server
//!
//! HTTP mutation routes plus the `/sync` WebSocket endpoint.
//! All domain behaviour is injected through [`ApplicationServices`].

mod error;
mod handlers;
pub mod logging_middleware;
mod state;

pub use error::ApiError;
pub use handlers::HealthResponse;
pub use state::AppState;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use tabletop_core::{ApplicationServices, DEFAULT_QUEUE_CAPACITY};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::auth::auth_middleware;
use crate::sync::sync_handler;

/// Default port for the gateway
pub const DEFAULT_PORT: u16 = 7420;

/// Gateway server configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Enable CORS for browser access
    pub enable_cors: bool,
    /// Queue capacity of each sync subscriber
    pub subscriber_capacity: usize,
    /// HMAC key for access tokens
    pub token_secret: Vec<u8>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            enable_cors: true,
            subscriber_capacity: DEFAULT_QUEUE_CAPACITY,
            token_secret: Vec::new(),
        }
    }
}

impl GatewayConfig {
    /// Get the socket address
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("Invalid gateway address '{}': {}", addr, e))
    }
}

/// Tabletop Gateway Server
///
/// Serves until the shutdown token is cancelled; cancelling also ends every
/// open sync session.
pub struct GatewayServer {
    config: GatewayConfig,
    state: AppState,
}

impl GatewayServer {
    pub fn new(
        config: GatewayConfig,
        services: ApplicationServices,
        shutdown: CancellationToken,
    ) -> Self {
        info!("[Gateway] Initializing...");
        let state = AppState::new(services, config.token_secret.clone(), shutdown);
        Self { config, state }
    }

    /// Get a handle to the shared request state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the Axum router
    pub fn build_router(&self) -> Router {
        build_router(self.state.clone(), self.config.enable_cors)
    }

    /// Run the gateway server until shutdown
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.config.addr()?;

        info!("[Gateway] Starting on {}", addr);
        info!(
            "[Gateway] CORS: {}",
            if self.config.enable_cors {
                "enabled"
            } else {
                "disabled"
            }
        );
        if self.config.token_secret.is_empty() {
            warn!("[Gateway] No token secret configured - every authenticated route will reject");
        }

        let router = self.build_router();
        let shutdown = self.state.shutdown_token();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("[Gateway] Ready to accept connections");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!("[Gateway] Stopped");
        Ok(())
    }

    /// Start the server in the background
    pub fn spawn(self) -> tokio::task::JoinHandle<anyhow::Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}

/// Assemble routes and layers around a prepared [`AppState`]
pub fn build_router(state: AppState, enable_cors: bool) -> Router {
    let protected = Router::new()
        .route("/sync", get(sync_handler))
        // Scenes
        .route("/tables/{table_id}/scenes", post(handlers::create_scene))
        .route("/scenes/{id}", put(handlers::update_scene))
        .route(
            "/tables/{table_id}/scenes/{id}",
            axum::routing::delete(handlers::delete_scene),
        )
        // Library
        .route("/tables/{table_id}/library", post(handlers::create_library_object))
        .route(
            "/library/{id}",
            put(handlers::update_library_object).delete(handlers::delete_library_object),
        )
        .route("/library/{id}/visibility", put(handlers::update_library_visibility))
        // Placed objects
        .route("/scenes/{scene_id}/placed", post(handlers::place_object))
        .route(
            "/placed/{id}",
            put(handlers::update_placed_object).delete(handlers::delete_placed_object),
        )
        .route("/placed/{id}/move", post(handlers::move_placed_object))
        .route("/placed/{id}/access", put(handlers::update_access))
        // Chat
        .route("/tables/{table_id}/messages", post(handlers::send_message))
        .route(
            "/tables/{table_id}/messages/private",
            post(handlers::send_private_message),
        )
        .route(
            "/messages/{id}",
            put(handlers::update_message).delete(handlers::delete_message),
        )
        // Membership
        .route(
            "/tables/{table_id}/members/{user_id}/role",
            put(handlers::change_role),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let mut router = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(
            logging_middleware::http_logging_middleware,
        ));

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router = router.layer(cors);
    }

    router
}
