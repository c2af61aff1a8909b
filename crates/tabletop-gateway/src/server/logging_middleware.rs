//! Request logging middleware
//!
//! Wraps every request in a [`TraceContext`] span with one entry and one exit
//! line. Mutation bodies are buffered so they can be logged at DEBUG along
//! with the error code of a rejected mutation. Health probes and the sync
//! upgrade pass through without buffering.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::BodyExt;
use tracing::{debug, warn, Instrument};

use crate::logging::{RequestKind, TraceContext};

/// Bodies above this size are logged by length only
const MAX_LOGGED_BODY: usize = 16 * 1024;

/// Characters kept from a non-JSON text body
const TEXT_PREVIEW_CHARS: usize = 200;

/// One-line rendering of a body for the log
pub fn summarize_body(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "[empty]".to_string();
    }
    if bytes.len() > MAX_LOGGED_BODY {
        return format!("[{} bytes]", bytes.len());
    }

    let Ok(text) = std::str::from_utf8(bytes) else {
        return format!("[binary: {} bytes]", bytes.len());
    };

    match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(json) => json.to_string(),
        Err(_) if text.chars().count() > TEXT_PREVIEW_CHARS => {
            let preview: String = text.chars().take(TEXT_PREVIEW_CHARS).collect();
            format!("{}...", preview)
        }
        Err(_) => text.to_string(),
    }
}

/// `error` field of a JSON error body, if there is one
fn error_code(bytes: &[u8]) -> Option<String> {
    let json: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    json.get("error")?.as_str().map(str::to_string)
}

async fn buffer(body: Body) -> Result<Bytes, axum::Error> {
    Ok(body.collect().await?.to_bytes())
}

pub async fn http_logging_middleware(request: Request, next: Next) -> Response {
    let ctx = TraceContext::new(request.method().as_str(), request.uri().path());
    let span = ctx.span();

    async move {
        ctx.log_entry();

        if ctx.kind != RequestKind::Mutation {
            let response = next.run(request).await;
            ctx.log_exit(response.status().as_u16());
            return response;
        }

        let (parts, body) = request.into_parts();
        let request_body = match buffer(body).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("[Gateway] Failed to read request body: {}", e);
                ctx.log_exit(StatusCode::BAD_REQUEST.as_u16());
                return StatusCode::BAD_REQUEST.into_response();
            }
        };
        if !request_body.is_empty() {
            debug!(body = %summarize_body(&request_body), "Request body");
        }

        let response = next
            .run(Request::from_parts(parts, Body::from(request_body)))
            .await;

        let (parts, body) = response.into_parts();
        let response_body = match buffer(body).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("[Gateway] Failed to read response body: {}", e);
                ctx.log_exit(StatusCode::INTERNAL_SERVER_ERROR.as_u16());
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        if parts.status.is_success() {
            debug!(body = %summarize_body(&response_body), "Response body");
        } else if let Some(code) = error_code(&response_body) {
            debug!(code = %code, "Mutation rejected");
        }
        ctx.log_exit(parts.status.as_u16());

        Response::from_parts(parts, Body::from(response_body))
    }
    .instrument(span)
    .await
}
