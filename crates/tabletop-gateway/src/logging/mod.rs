//! Request logging support
//!
//! Every HTTP request is tagged with a short trace id and classified so the
//! logging middleware can emit one entry and one exit line per request.

mod trace_context;

pub use trace_context::{generate_trace_id, RequestKind, TraceContext};
