//! Inbound request helpers.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) as early as possible
//! - Extract the forwarding-relevant headers (request id, session cookie)
//! - Decode the optional JSON body

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Request};
use serde_json::Value;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::forward::FieldError;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request ids for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

pub fn request_id(headers: &HeaderMap) -> Option<String> {
    header_text(headers, X_REQUEST_ID)
}

/// The caller's `Cookie` header, byte for byte.
pub fn session_cookie(headers: &HeaderMap) -> Option<HeaderValue> {
    headers
        .get(header::COOKIE)
        .filter(|value| !value.is_empty())
        .cloned()
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Empty bodies mean "no body"; anything else must be JSON.
pub fn json_body(bytes: &Bytes) -> Result<Option<Value>, FieldError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes)
        .map(Some)
        .map_err(|_| FieldError::MalformedBody)
}
