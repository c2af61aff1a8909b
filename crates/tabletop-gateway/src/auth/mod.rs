//! Caller authentication for the gateway
//!
//! Access tokens are `base64url(payload).base64url(hmac_sha256(payload))`
//! where the payload carries the user id and expiry. Account management
//! lives elsewhere; this module only mints and checks tokens.

use axum::{
    body::Body,
    extract::{FromRequestParts, Query, State},
    http::{header, request::Parts, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tabletop_core::UserId;
use tracing::{debug, warn};

use crate::server::AppState;

type HmacSha256 = Hmac<Sha256>;

/// `?access_token=` accepted on the sync endpoint, where browsers cannot set headers
#[derive(Debug, Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

/// Authenticated caller, injected into request extensions by [`auth_middleware`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// User the token was issued to
    pub user_id: UserId,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

/// Extractor for the authenticated caller
///
/// Usage in handlers: `caller: Caller`
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .cloned()
            .ok_or_else(|| unauthorized_response("invalid_token", "Missing authentication context"))
    }
}

/// Token creation failure
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token secret is empty")]
    EmptySecret,

    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("failed to encode claims: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Validate a token and extract the caller
pub fn validate_token(token: &str, secret: &[u8]) -> Option<Caller> {
    if secret.is_empty() {
        warn!("[Auth] No token secret configured - rejecting token");
        return None;
    }

    let Some((payload_b64, signature_b64)) = token.split_once('.') else {
        debug!("[Auth] Invalid token format - missing signature");
        return None;
    };

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload_b64.as_bytes());

    let signature = base64_url_decode(signature_b64)?;
    if mac.verify_slice(&signature).is_err() {
        debug!("[Auth] Invalid token signature");
        return None;
    }

    let payload = base64_url_decode(payload_b64)?;
    let caller: Caller = serde_json::from_slice(&payload).ok()?;

    if caller.user_id == 0 {
        debug!("[Auth] Token carries no user");
        return None;
    }

    let now = chrono::Utc::now().timestamp();
    if now > caller.exp {
        debug!("[Auth] Token expired at {}, now is {}", caller.exp, now);
        return None;
    }

    Some(caller)
}

/// Create a signed access token for `user_id`, valid for `expires_in` seconds
pub fn create_access_token(
    user_id: UserId,
    expires_in: i64,
    secret: &[u8],
) -> Result<String, TokenError> {
    let now = chrono::Utc::now().timestamp();
    let caller = Caller {
        user_id,
        exp: now + expires_in,
        iat: now,
    };

    sign_token(&serde_json::to_vec(&caller)?, secret)
}

/// Sign a payload and create token string
fn sign_token(payload: &[u8], secret: &[u8]) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::EmptySecret);
    }

    let payload_b64 = base64_url_encode(payload);

    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|e| TokenError::InvalidKey(e.to_string()))?;
    mac.update(payload_b64.as_bytes());
    let signature_b64 = base64_url_encode(&mac.finalize().into_bytes());

    Ok(format!("{}.{}", payload_b64, signature_b64))
}

/// Base64 URL-safe encoding (no padding)
fn base64_url_encode(data: &[u8]) -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    URL_SAFE_NO_PAD.encode(data)
}

/// Base64 URL-safe decoding
fn base64_url_decode(s: &str) -> Option<Vec<u8>> {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    URL_SAFE_NO_PAD.decode(s).ok()
}

/// Pull the raw token from the Authorization header or the `access_token` query parameter
fn extract_token(request: &Request<Body>) -> Result<Option<String>, &'static str> {
    if let Some(value) = request.headers().get(header::AUTHORIZATION) {
        let value = value.to_str().map_err(|_| "Invalid Authorization header")?;
        return match value.strip_prefix("Bearer ") {
            Some(token) => Ok(Some(token.trim().to_string())),
            None => Err("Invalid Authorization header format"),
        };
    }

    let token = Query::<TokenQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(query)| query.access_token)
        .filter(|token| !token.is_empty());

    Ok(token)
}

/// Authentication middleware
///
/// Validates the access token and injects the [`Caller`] into request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    // Skip auth for OPTIONS (CORS preflight)
    if request.method() == axum::http::Method::OPTIONS {
        return next.run(request).await;
    }

    let token = match extract_token(&request) {
        Ok(Some(token)) => token,
        Ok(None) => {
            debug!("[Auth] No access token on {}", request.uri().path());
            return unauthorized_response("invalid_token", "Missing access token");
        }
        Err(reason) => {
            warn!("[Auth] {}", reason);
            return unauthorized_response("invalid_request", reason);
        }
    };

    match validate_token(&token, state.token_secret()) {
        Some(caller) => {
            debug!("[Auth] Valid token for user: {}", caller.user_id);
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        None => {
            warn!("[Auth] Invalid or expired token");
            unauthorized_response("invalid_token", "Token is invalid or expired")
        }
    }
}

/// 401 Unauthorized with a JSON body
fn unauthorized_response(error: &str, description: &str) -> Response {
    let www_authenticate = format!(
        r#"Bearer realm="Tabletop", error="{}", error_description="{}""#,
        error, description
    );

    let body = serde_json::json!({
        "error": error,
        "message": description,
    });

    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, www_authenticate)],
        axum::Json(body),
    )
        .into_response()
}
