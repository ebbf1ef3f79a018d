//! Authentication middleware for the HTTP surface
//!
//! Provides optional HTTP Basic authentication covering every route — API,
//! documentation, and static files alike. When credentials are configured,
//! requests must carry a matching `Authorization: Basic ...` header or they
//! receive a 401 with a `WWW-Authenticate` challenge. Without configured
//! credentials the gate is disabled and all requests pass through.

use crate::config::BasicAuthConfig;
use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;

/// Challenge sent with every 401 so browsers prompt for credentials
const CHALLENGE: &str = "Basic realm=\"MediaFetch\"";

/// Authentication middleware checking the `Authorization` header
///
/// # Arguments
///
/// * `State(expected)` - Configured credentials; `None` disables the gate
/// * `request` - The incoming HTTP request
/// * `next` - The next middleware/handler in the chain
///
/// # Returns
///
/// Returns either:
/// - 401 Unauthorized with a `WWW-Authenticate` challenge if credentials are
///   missing, malformed, or wrong
/// - The response from the next handler if authentication succeeds
pub async fn require_basic_auth(
    State(expected): State<Option<BasicAuthConfig>>,
    request: Request,
    next: Next,
) -> Response {
    // No credentials configured: open access
    let Some(expected) = expected else {
        return next.run(request).await;
    };

    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match header_value.and_then(decode_basic_credentials) {
        Some((username, password)) => {
            // Compare both fields in constant time to avoid leaking which
            // one mismatched through response timing
            let user_ok = constant_time_eq(username.as_bytes(), expected.username.as_bytes());
            let pass_ok = constant_time_eq(password.as_bytes(), expected.password.as_bytes());

            if user_ok && pass_ok {
                next.run(request).await
            } else {
                unauthorized_response("Invalid credentials")
            }
        }
        None => unauthorized_response("Authentication required"),
    }
}

/// Decode `Basic <base64(user:pass)>` into its credential pair
///
/// Returns `None` for non-Basic schemes, invalid base64, non-UTF-8 payloads,
/// and payloads without a `:` separator.
fn decode_basic_credentials(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Constant-time byte comparison to prevent timing side-channel attacks.
/// Always compares all bytes regardless of where the first mismatch occurs.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// 401 response carrying the Basic challenge and a JSON error body
fn unauthorized_response(message: &str) -> Response {
    let body = Json(json!({
        "error": {
            "code": "unauthorized",
            "message": message
        }
    }));

    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, CHALLENGE)],
        body,
    )
        .into_response()
}
