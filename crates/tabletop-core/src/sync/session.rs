//! Streaming sync session
//!
//! One session per connected client:
//!
//! 1. The first client frame is a [`SyncRequest`] naming a table and/or a scene.
//! 2. A bounded queue is allocated and joined to `table:<id>` / `scene:<id>`
//!    for each non-zero id.
//! 3. Relay loop: forward queued events to the client until the client
//!    closes, the transport fails, or the server shuts down.
//! 4. The subscription guard unsubscribes every joined topic on every exit
//!    path before the queue is released.
//!
//! Frames received after the first are ignored; scopes cannot be changed
//! mid-session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::broker::SharedBroker;
use crate::domain::{SceneId, SyncEvent, TableId};
use crate::topic::Topic;

/// Scope selection sent by the client as its first frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    #[serde(default)]
    pub table_id: TableId,
    #[serde(default)]
    pub scene_id: SceneId,
}

impl SyncRequest {
    pub fn new(table_id: TableId, scene_id: SceneId) -> Self {
        Self { table_id, scene_id }
    }

    /// Topics for every non-zero id
    pub fn topics(&self) -> Vec<Topic> {
        let mut topics = Vec::with_capacity(2);
        if self.table_id != 0 {
            topics.push(Topic::table(self.table_id));
        }
        if self.scene_id != 0 {
            topics.push(Topic::scene(self.scene_id));
        }
        topics
    }
}

/// Failure of the underlying client stream
#[derive(Debug, Clone, thiserror::Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// Bidirectional client stream
///
/// `recv` must be cancel-safe: the session polls it inside `select!` and
/// drops the future whenever an event is ready first. `send` may be dropped
/// mid-write when the server shuts down.
#[async_trait]
pub trait SyncTransport: Send {
    /// Next text frame from the client, `None` once the client has closed
    async fn recv(&mut self) -> Result<Option<String>, TransportError>;

    /// Push one event to the client
    async fn send(&mut self, event: &SyncEvent) -> Result<(), TransportError>;

    /// Tell the client why the session is being closed
    async fn reject(&mut self, reason: &str) -> Result<(), TransportError>;
}

/// Why a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// Client closed the stream
    ClientClosed,
    /// Reading from or writing to the client failed
    TransportError(String),
    /// Server is shutting down
    Shutdown,
    /// First frame was not a valid sync request
    ProtocolError(String),
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEnd::ClientClosed => write!(f, "client closed"),
            SessionEnd::TransportError(e) => write!(f, "transport error: {}", e),
            SessionEnd::Shutdown => write!(f, "shutdown"),
            SessionEnd::ProtocolError(e) => write!(f, "protocol error: {}", e),
        }
    }
}

/// Runs the sync protocol for one client
#[derive(Clone)]
pub struct SyncSession {
    broker: SharedBroker,
    shutdown: CancellationToken,
}

impl SyncSession {
    pub fn new(broker: SharedBroker, shutdown: CancellationToken) -> Self {
        Self { broker, shutdown }
    }

    /// Drive the session to completion over `transport`
    pub async fn run<T: SyncTransport>(&self, transport: &mut T) -> SessionEnd {
        let request = match self.read_request(transport).await {
            Ok(request) => request,
            Err(end) => {
                debug!(reason = %end, "[Session] Ended before subscribing");
                return end;
            }
        };

        let topics = request.topics();
        if topics.is_empty() {
            let reason = "sync request must name a table or a scene".to_string();
            if let Err(e) = transport.reject(&reason).await {
                trace!(error = %e, "[Session] Failed to send rejection");
            }
            return SessionEnd::ProtocolError(reason);
        }

        let (subscriber, mut inbox) = self.broker.new_subscriber();
        let subscription = self.broker.join(&subscriber, topics);
        drop(subscriber);

        info!(
            subscriber_id = subscription.subscriber_id(),
            table_id = request.table_id,
            scene_id = request.scene_id,
            "[Session] Subscribed"
        );

        let end = 'relay: loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => break SessionEnd::Shutdown,

                event = inbox.recv() => match event {
                    Some(event) => {
                        // Shutdown also interrupts a stalled write
                        let sent = tokio::select! {
                            biased;
                            _ = self.shutdown.cancelled() => break 'relay SessionEnd::Shutdown,
                            sent = transport.send(&event) => sent,
                        };
                        if let Err(e) = sent {
                            break SessionEnd::TransportError(e.0);
                        }
                    }
                    None => break SessionEnd::TransportError("event queue closed".to_string()),
                },

                frame = transport.recv() => match frame {
                    Ok(Some(_)) => {
                        trace!(
                            subscriber_id = subscription.subscriber_id(),
                            "[Session] Ignoring frame after sync request"
                        );
                    }
                    Ok(None) => break SessionEnd::ClientClosed,
                    Err(e) => break SessionEnd::TransportError(e.0),
                },
            }
        };

        let subscriber_id = subscription.subscriber_id();
        drop(subscription);
        drop(inbox);

        match &end {
            SessionEnd::TransportError(e) => {
                warn!(subscriber_id, error = %e, "[Session] Closed after transport error")
            }
            other => info!(subscriber_id, reason = %other, "[Session] Closed"),
        }

        end
    }

    async fn read_request<T: SyncTransport>(
        &self,
        transport: &mut T,
    ) -> Result<SyncRequest, SessionEnd> {
        let frame = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return Err(SessionEnd::Shutdown),
            frame = transport.recv() => frame,
        };

        match frame {
            Ok(Some(text)) => match serde_json::from_str::<SyncRequest>(&text) {
                Ok(request) => Ok(request),
                Err(e) => {
                    let reason = format!("invalid sync request: {}", e);
                    if let Err(e) = transport.reject(&reason).await {
                        trace!(error = %e, "[Session] Failed to send rejection");
                    }
                    Err(SessionEnd::ProtocolError(reason))
                }
            },
            Ok(None) => Err(SessionEnd::ClientClosed),
            Err(e) => Err(SessionEnd::TransportError(e.0)),
        }
    }
}
