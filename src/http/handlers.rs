//! Route handlers.
//!
//! Every forwarder endpoint is the same function specialised by a static
//! descriptor; [`collection`] and [`member`] build the axum handlers.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use futures_util::future::{BoxFuture, FutureExt};
use serde::Serialize;

use crate::forward::{ForwardError, ForwardRequest, Forwarder, ResourceDescriptor};
use crate::http::request::{json_body, request_id, session_cookie};
use crate::http::server::AppState;

/// Handler for a collection route (`/api/admin/payments`).
pub fn collection(
    descriptor: &'static ResourceDescriptor,
) -> impl Fn(State<AppState>, HeaderMap, Result<Bytes, BytesRejection>) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static
{
    move |State(state): State<AppState>, headers: HeaderMap, body: Result<Bytes, BytesRejection>| {
        dispatch(state, descriptor, None, headers, body).boxed()
    }
}

/// Handler for a member route (`/api/admin/payments/{id}`).
pub fn member(
    descriptor: &'static ResourceDescriptor,
) -> impl Fn(State<AppState>, Path<String>, HeaderMap, Result<Bytes, BytesRejection>) -> BoxFuture<'static, Response>
       + Clone
       + Send
       + Sync
       + 'static {
    move |State(state): State<AppState>,
          Path(id): Path<String>,
          headers: HeaderMap,
          body: Result<Bytes, BytesRejection>| {
        dispatch(state, descriptor, Some(id), headers, body).boxed()
    }
}

async fn dispatch(
    state: AppState,
    descriptor: &'static ResourceDescriptor,
    id: Option<String>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = request_id(&headers);
    let body = match read_body(descriptor, body) {
        Ok(body) => body,
        Err(error) => {
            let id = request_id.as_deref().unwrap_or_default();
            return Forwarder::reject(descriptor, id, &error).into_response();
        }
    };

    let request = ForwardRequest {
        id,
        body,
        cookie: session_cookie(&headers),
        request_id,
    };

    // Snapshot per call; a reload mid-flight does not affect this request.
    let target = state.target.load_full();
    state
        .forwarder
        .forward(&target, descriptor, request)
        .await
        .into_response()
}

/// Decode the JSON body for verbs that carry one; rejections keep the envelope.
fn read_body(
    descriptor: &ResourceDescriptor,
    body: Result<Bytes, BytesRejection>,
) -> Result<Option<serde_json::Value>, ForwardError> {
    let bytes = body?;
    if !descriptor.verb.carries_body() {
        return Ok(None);
    }
    Ok(json_body(&bytes)?)
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub backend: String,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        backend: state.target.load().base_url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forward::FieldError;
    use crate::resources::{complaints, employees};

    #[test]
    fn test_read_body_ignores_body_on_listings() {
        let body = read_body(&employees::LIST, Ok(Bytes::from_static(b"{oops"))).unwrap();
        assert!(body.is_none());
    }

    #[test]
    fn test_read_body_rejects_malformed_json() {
        let err = read_body(&complaints::CREATE, Ok(Bytes::from_static(b"{oops"))).unwrap_err();
        assert!(matches!(err, ForwardError::Validation(FieldError::MalformedBody)));
    }
}
