// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode
//!
//! Credentials pass through this service in plain text, so `password` and
//! `token` values are replaced with `***` before anything is logged.

use axum::body::to_bytes;
use axum::{body::Body, extract::Request, http::StatusCode, middleware::Next, response::Response};
use tracing::{debug, enabled, Level};

const REDACTED_KEYS: [&str; 3] = ["password", "token", "code"];
const MAX_LOGGED_BODY: usize = 64 * 1024;

/// Middleware to log request and response bodies in debug mode
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();

    let bytes = to_bytes(body, MAX_LOGGED_BODY)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;

    if !bytes.is_empty() {
        if let Ok(body_str) = std::str::from_utf8(&bytes) {
            debug!(
                method = %parts.method,
                uri = %parts.uri.path(),
                request_body = %redact_body(body_str),
                "📥 Request"
            );
        }
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        if let Ok(body_str) = std::str::from_utf8(&bytes) {
            debug!(
                status = %parts.status,
                response_body = %redact_body(body_str),
                "📤 Response"
            );
        }
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

/// Mask sensitive values in a JSON or urlencoded body.
/// Anything else (HTML, plain text) is summarised by length only.
pub fn redact_body(body: &str) -> String {
    if let Ok(mut json) = serde_json::from_str::<serde_json::Value>(body) {
        redact_json(&mut json);
        return serde_json::to_string_pretty(&json).unwrap_or_else(|_| "<unprintable>".to_string());
    }

    if body.contains('=') && !body.contains('<') && !body.contains(char::is_whitespace) {
        return body
            .split('&')
            .map(|pair| match pair.split_once('=') {
                Some((key, _)) if REDACTED_KEYS.contains(&key) => format!("{}=***", key),
                _ => pair.to_string(),
            })
            .collect::<Vec<_>>()
            .join("&");
    }

    format!("<{} bytes>", body.len())
}

fn redact_json(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if REDACTED_KEYS.contains(&key.as_str()) {
                    *val = serde_json::Value::String("***".to_string());
                } else {
                    redact_json(val);
                }
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(redact_json),
        _ => {}
    }
}
