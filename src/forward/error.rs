//! Failure taxonomy for forwarded calls.

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use thiserror::Error;

use crate::forward::transport::TransportError;

/// Client-side input problems caught before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} must be a number")]
    NotNumeric { field: &'static str },

    #[error("{field} must be a whole number")]
    NotInteger { field: &'static str },

    #[error("{field} must be greater than 0")]
    NotPositive { field: &'static str },

    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("{field} must be one of: {}", .allowed.join(", "))]
    NotAllowed {
        field: &'static str,
        allowed: &'static [&'static str],
    },

    #[error("request body must be a JSON object")]
    MalformedBody,
}

impl FieldError {
    /// Name of the offending field, for metrics labels.
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::Missing { field }
            | FieldError::NotNumeric { field }
            | FieldError::NotInteger { field }
            | FieldError::NotPositive { field }
            | FieldError::Negative { field }
            | FieldError::NotAllowed { field, .. } => field,
            FieldError::MalformedBody => "body",
        }
    }
}

/// Errors that can occur while forwarding a call.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Rejected before any I/O.
    #[error(transparent)]
    Validation(#[from] FieldError),

    /// Inbound body could not be read, e.g. over the size limit.
    #[error("{}", .0.body_text())]
    Body(#[from] BytesRejection),

    /// Backend answered with a non-success status.
    #[error("{message}")]
    Backend { status: StatusCode, message: String },

    /// Network failure or an unexpected success payload.
    #[error("Failed to {action}")]
    Transport {
        action: &'static str,
        #[source]
        source: TransportError,
    },
}

impl ForwardError {
    /// Status code reported to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::Validation(_) => StatusCode::BAD_REQUEST,
            ForwardError::Body(rejection) => rejection.status(),
            ForwardError::Backend { status, .. } => {
                if status.is_client_error() || status.is_server_error() {
                    *status
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
            ForwardError::Transport { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
