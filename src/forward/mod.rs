//! Request forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! ForwardRequest (id, JSON body, cookie)
//!     → descriptor.rs (resolve backend path)
//!     → validation.rs (required fields, numeric coercion, choices)
//!     → transport.rs (one outbound call to base_url + path)
//!     → shape success (pass-through, acknowledgement, mapped listing)
//!       or normalize failure (validation, backend, transport)
//!     → ForwardResponse (status + JSON envelope)
//! ```
//!
//! # Design Decisions
//! - One generic primitive, parameterized by static descriptors
//! - Backend target is injected per call
//! - Single attempt: no retries, no caching, no dedup

pub mod descriptor;
pub mod error;
pub mod transport;
pub mod validation;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use axum::http::HeaderValue;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::observability::metrics;

pub use descriptor::{Envelope, ResourceDescriptor, SuccessShape, Verb};
pub use error::{FieldError, ForwardError};
pub use transport::{BackendReply, BackendTarget, OutboundRequest, ReqwestTransport, Transport, TransportError};

/// Caller input for one forwarded operation.
#[derive(Debug, Clone, Default)]
pub struct ForwardRequest {
    /// Record identifier for member routes.
    pub id: Option<String>,
    pub body: Option<Value>,
    /// Raw `Cookie` header from the caller.
    pub cookie: Option<HeaderValue>,
    pub request_id: Option<String>,
}

/// Normalized result handed back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ForwardResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    /// Render a failure in the descriptor's envelope.
    pub fn from_error(descriptor: &ResourceDescriptor, error: &ForwardError) -> Self {
        Self {
            status: error.status(),
            body: descriptor.envelope.failure(&error.to_string()),
        }
    }
}

impl IntoResponse for ForwardResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Upper bound on one backend call when none is configured.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// Relays validated calls to the backend through a [`Transport`].
#[derive(Clone)]
pub struct Forwarder {
    transport: Arc<dyn Transport>,
    deadline: Duration,
}

impl Forwarder {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Bound every backend call, whatever the per-target timeout says.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Forward one caller operation and normalize the outcome.
    pub async fn forward(
        &self,
        target: &BackendTarget,
        descriptor: &ResourceDescriptor,
        request: ForwardRequest,
    ) -> ForwardResponse {
        let start = Instant::now();
        let request_id = request.request_id.clone().unwrap_or_default();

        let response = match self.try_forward(target, descriptor, request).await {
            Ok(response) => response,
            Err(error) => Self::reject(descriptor, &request_id, &error),
        };

        metrics::record_forward(descriptor.resource, descriptor.action, response.status.as_u16(), start);
        response
    }

    /// Log a failure and render it in the descriptor's envelope.
    pub fn reject(descriptor: &ResourceDescriptor, request_id: &str, error: &ForwardError) -> ForwardResponse {
        log_failure(request_id, descriptor, error);
        ForwardResponse::from_error(descriptor, error)
    }

    async fn try_forward(
        &self,
        target: &BackendTarget,
        descriptor: &ResourceDescriptor,
        request: ForwardRequest,
    ) -> Result<ForwardResponse, ForwardError> {
        let segments = descriptor.path_segments(request.id.as_deref())?;
        let body = if descriptor.verb.carries_body() {
            Some(validation::prepare_body(descriptor, request.body)?)
        } else {
            None
        };

        let transport_failure = |source: TransportError| ForwardError::Transport {
            action: descriptor.action,
            source,
        };
        let outbound = OutboundRequest {
            method: descriptor.verb.method(),
            url: target.url_for(&segments).map_err(transport_failure)?,
            body,
            cookie: request.cookie.filter(|_| descriptor.session),
            request_id: request.request_id,
            timeout: target.timeout,
        };

        tracing::debug!(
            resource = descriptor.resource,
            action = descriptor.action,
            method = %outbound.method,
            url = %outbound.url,
            "Forwarding request"
        );

        let reply = tokio::time::timeout(self.deadline, self.transport.send(outbound))
            .await
            .map_err(|_| transport_failure(TransportError::TimedOut(self.deadline)))?
            .map_err(transport_failure)?;
        if !(200..300).contains(&reply.status) {
            return Err(backend_failure(descriptor, &reply));
        }
        shape_success(descriptor, &reply.body).map_err(transport_failure)
    }
}

fn log_failure(request_id: &str, descriptor: &ResourceDescriptor, error: &ForwardError) {
    match error {
        ForwardError::Body(rejection) => {
            tracing::debug!(request_id, resource = descriptor.resource, error = %rejection, "Rejected request body");
        }
        ForwardError::Validation(field_error) => {
            metrics::record_validation_rejection(descriptor.resource, field_error.field());
            tracing::debug!(request_id, resource = descriptor.resource, error = %field_error, "Rejected request");
        }
        ForwardError::Backend { status, message } => {
            tracing::warn!(request_id, resource = descriptor.resource, status = %status, message = %message, "Backend returned an error");
        }
        ForwardError::Transport { action, source } => {
            tracing::error!(request_id, resource = descriptor.resource, action, error = %source, "Backend call failed");
        }
    }
}

/// Map a non-success reply, preferring the backend's own message.
fn backend_failure(descriptor: &ResourceDescriptor, reply: &BackendReply) -> ForwardError {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = backend_message(&reply.body).unwrap_or_else(|| {
        format!(
            "Failed to {}: {} error: {}",
            descriptor.action, descriptor.label, reply.status
        )
    });
    ForwardError::Backend { status, message }
}

fn backend_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|message| !message.is_empty())
        .map(str::to_string)
}

fn shape_success(descriptor: &ResourceDescriptor, body: &[u8]) -> Result<ForwardResponse, TransportError> {
    let is_empty = body.iter().all(u8::is_ascii_whitespace);
    let parse = || serde_json::from_slice::<Value>(body).map_err(|_| TransportError::UnexpectedPayload);

    let shaped = match descriptor.success {
        SuccessShape::PassThrough { default_message } if is_empty => {
            descriptor.envelope.acknowledged(default_message)
        }
        SuccessShape::PassThrough { .. } => parse()?,
        SuccessShape::Message(message) => descriptor.envelope.acknowledged(message),
        SuccessShape::MessageWithData(message) => {
            let data = if is_empty { Value::Null } else { parse()? };
            serde_json::json!({ "message": message, "data": data })
        }
        SuccessShape::Listing(mapper) => mapper(parse()?).ok_or(TransportError::UnexpectedPayload)?,
    };
    Ok(ForwardResponse::ok(shaped))
}

#[cfg(test)]
pub(crate) mod stub {
    //! In-process transport used by unit tests.

    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    pub struct StubTransport {
        /// `None` simulates a failed connection.
        reply: Option<BackendReply>,
        delay: Option<Duration>,
        pub calls: Mutex<Vec<OutboundRequest>>,
    }

    impl StubTransport {
        pub fn replying(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(BackendReply {
                    status,
                    body: body.as_bytes().to_vec(),
                }),
                delay: None,
                calls: Mutex::new(Vec::new()),
            })
        }

        pub fn unreachable() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                delay: None,
                calls: Mutex::new(Vec::new()),
            })
        }

        /// Replies 200 with `body` only after `delay`.
        pub fn stalling(delay: Duration, body: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(BackendReply {
                    status: 200,
                    body: body.as_bytes().to_vec(),
                }),
                delay: Some(delay),
                calls: Mutex::new(Vec::new()),
            })
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn last_call(&self) -> OutboundRequest {
            self.calls.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn send(&self, request: OutboundRequest) -> Result<BackendReply, TransportError> {
            self.calls.lock().unwrap().push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.reply.clone().ok_or(TransportError::UnexpectedPayload)
        }
    }

    pub fn target() -> BackendTarget {
        BackendTarget::new(url::Url::parse("http://backend.test:3001").unwrap())
    }
}
