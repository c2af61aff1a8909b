//! Tabletop Gateway
//!
//! Network surface of the sync subsystem:
//! - Bearer-token authentication of every mutation and stream
//! - HTTP routes that drive the application services
//! - `/sync` WebSocket sessions relaying broker events to clients
//! - Request logging with per-request trace ids

pub mod auth;
pub mod logging;
pub mod server;
pub mod sync;

pub use auth::{create_access_token, validate_token, Caller, TokenError};
pub use server::{build_router, ApiError, AppState, GatewayConfig, GatewayServer, HealthResponse};
pub use sync::{sync_handler, WsTransport};
