//! `/sync` WebSocket endpoint
//!
//! ```text
//!   client                      gateway                       broker
//!     │  GET /sync (upgrade)      │                              │
//!     │──────────────────────────▶│                              │
//!     │  {"table_id":1,           │                              │
//!     │   "scene_id":7}           │  join table:1, scene:7       │
//!     │──────────────────────────▶│─────────────────────────────▶│
//!     │        event frames       │        queued events         │
//!     │◀──────────────────────────│◀─────────────────────────────│
//!     │  close / error / shutdown │  unsubscribe all             │
//!     │──────────────────────────▶│─────────────────────────────▶│
//! ```

mod transport;

pub use transport::WsTransport;

use axum::{
    extract::{ws::WebSocketUpgrade, State},
    response::Response,
};
use tabletop_core::SyncSession;
use tracing::{debug, info};

use crate::auth::Caller;
use crate::server::AppState;

/// Upgrade to a WebSocket and run one sync session on it
pub async fn sync_handler(
    State(state): State<AppState>,
    caller: Caller,
    ws: WebSocketUpgrade,
) -> Response {
    debug!(user_id = caller.user_id, "[Sync] Upgrade requested");

    let session = SyncSession::new(state.broker(), state.shutdown_token().child_token());

    ws.on_upgrade(move |socket| async move {
        let mut transport = WsTransport::new(socket);
        let end = session.run(&mut transport).await;
        transport.close(&end).await;

        info!(user_id = caller.user_id, reason = %end, "[Sync] Session finished");
    })
}
