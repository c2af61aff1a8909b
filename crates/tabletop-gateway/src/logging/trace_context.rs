//! Per-request trace context
//!
//! Each request gets a short trace id and a [`RequestKind`] so log lines can
//! be correlated and filtered: mutations are the interesting traffic, health
//! probes are noise, and sync upgrades outlive the request that opened them.

use std::time::Instant;
use tracing::{debug, info, info_span, warn, Span};
use uuid::Uuid;

/// Length of the printed trace id
const TRACE_ID_LEN: usize = 8;

/// Short random id, e.g. `3f9c01ab`
pub fn generate_trace_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(TRACE_ID_LEN);
    id
}

/// What a request does, derived from its method and path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Liveness probe
    Health,
    /// WebSocket upgrade opening a sync session
    Sync,
    /// State-changing call that may publish an event
    Mutation,
    /// Anything else (CORS preflight, unknown routes)
    Other,
}

impl RequestKind {
    pub fn classify(method: &str, path: &str) -> Self {
        match (method, path) {
            (_, "/health") => RequestKind::Health,
            (_, "/sync") => RequestKind::Sync,
            ("POST" | "PUT" | "DELETE", _) => RequestKind::Mutation,
            _ => RequestKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Health => "health",
            RequestKind::Sync => "sync",
            RequestKind::Mutation => "mutation",
            RequestKind::Other => "other",
        }
    }
}

/// Correlation data for one HTTP request
#[derive(Debug, Clone)]
pub struct TraceContext {
    pub trace_id: String,
    pub kind: RequestKind,
    pub method: String,
    pub path: String,
    pub started_at: Instant,
}

impl TraceContext {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            trace_id: generate_trace_id(),
            kind: RequestKind::classify(method, path),
            method: method.to_string(),
            path: path.to_string(),
            started_at: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }

    /// Whether the response body is a long-lived stream that must not be buffered
    pub fn is_stream(&self) -> bool {
        self.kind == RequestKind::Sync
    }

    /// Span that tags every log line emitted while handling the request
    pub fn span(&self) -> Span {
        info_span!(
            "request",
            trace_id = %self.trace_id,
            kind = self.kind.as_str(),
        )
    }

    pub fn log_entry(&self) {
        match self.kind {
            RequestKind::Health => debug!("→ {} {}", self.method, self.path),
            _ => info!("→ {} {}", self.method, self.path),
        }
    }

    /// Log completion; client and server errors are raised to WARN
    pub fn log_exit(&self, status: u16) {
        let elapsed = self.elapsed_ms();
        match (self.kind, status) {
            (RequestKind::Sync, 101) => info!("← {} session opened ({}ms)", status, elapsed),
            (_, status) if status >= 400 => warn!(
                "← {} {} {} ({}ms)",
                status, self.method, self.path, elapsed
            ),
            (RequestKind::Health, _) => debug!("← {} ({}ms)", status, elapsed),
            _ => info!("← {} ({}ms)", status, elapsed),
        }
    }
}
