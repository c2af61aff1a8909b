//! Real-time sync streaming
//!
//! Transport-agnostic session protocol; the gateway adapts it to WebSockets.

mod session;

pub use session::{SessionEnd, SyncRequest, SyncSession, SyncTransport, TransportError};
