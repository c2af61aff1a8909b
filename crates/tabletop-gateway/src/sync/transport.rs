//! SyncTransport over an axum WebSocket

use async_trait::async_trait;
use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket};
use serde_json::json;
use tabletop_core::{SessionEnd, SyncEvent, SyncTransport, TransportError};
use tracing::trace;

/// One text frame per event, JSON encoded
pub struct WsTransport {
    socket: WebSocket,
}

impl WsTransport {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }

    /// Send the close frame matching how the session ended
    ///
    /// Nothing is sent when the client already closed or the socket failed.
    pub async fn close(mut self, end: &SessionEnd) {
        let (code, reason) = match end {
            SessionEnd::ClientClosed | SessionEnd::TransportError(_) => return,
            SessionEnd::Shutdown => (close_code::AWAY, "server shutting down"),
            SessionEnd::ProtocolError(_) => (close_code::POLICY, "invalid sync request"),
        };

        let frame = CloseFrame {
            code,
            reason: reason.into(),
        };
        if let Err(e) = self.socket.send(Message::Close(Some(frame))).await {
            trace!(error = %e, "[Sync] Close frame not delivered");
        }
    }
}

#[async_trait]
impl SyncTransport for WsTransport {
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            let Some(message) = self.socket.recv().await else {
                return Ok(None);
            };

            match message.map_err(|e| TransportError(e.to_string()))? {
                Message::Text(text) => return Ok(Some(text.to_string())),
                Message::Binary(bytes) => {
                    return String::from_utf8(bytes.to_vec())
                        .map(Some)
                        .map_err(|_| TransportError("binary frame is not UTF-8".to_string()));
                }
                Message::Close(_) => return Ok(None),
                // Pings are answered by the websocket layer
                Message::Ping(_) | Message::Pong(_) => continue,
            }
        }
    }

    async fn send(&mut self, event: &SyncEvent) -> Result<(), TransportError> {
        let text = serde_json::to_string(event).map_err(|e| TransportError(e.to_string()))?;
        self.socket
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| TransportError(e.to_string()))
    }

    async fn reject(&mut self, reason: &str) -> Result<(), TransportError> {
        let body = json!({ "error": "invalid_argument", "message": reason }).to_string();
        self.socket
            .send(Message::Text(body.into()))
            .await
            .map_err(|e| TransportError(e.to_string()))
    }
}
