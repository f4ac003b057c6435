//! Outbound HTTP transport.
//!
//! # Responsibilities
//! - Issue exactly one request per forwarded call
//! - Set JSON content negotiation headers
//! - Attach the caller's session cookie and request id when given
//! - Apply the per-target timeout, if any
//!
//! # Design Decisions
//! - [`Transport`] is the seam tests replace with a stub
//! - The backend target is passed per call, never stored in the transport
//! - No retries, no caching

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE, COOKIE};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::BackendConfig;

/// Transport-level failures.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid backend URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend URL '{0}' cannot carry a path")]
    NotABase(Url),

    #[error("no backend reply within {0:?}")]
    TimedOut(Duration),

    #[error("unexpected response payload from backend")]
    UnexpectedPayload,
}

/// Snapshot of where and how to reach the backend for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTarget {
    pub base_url: Url,
    pub timeout: Option<Duration>,
}

impl BackendTarget {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: None,
        }
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, TransportError> {
        Ok(Self {
            base_url: Url::parse(&config.base_url)?,
            timeout: config.timeout_secs.map(Duration::from_secs),
        })
    }

    /// Append percent-encoded path segments, keeping any path prefix on the base URL.
    pub fn url_for(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| TransportError::NotABase(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// A single request toward the backend.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Value>,
    /// Caller's `Cookie` header bytes, relayed as received.
    pub cookie: Option<HeaderValue>,
    pub request_id: Option<String>,
    pub timeout: Option<Duration>,
}

/// Raw backend reply: status plus undecoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendReply {
    pub status: u16,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<BackendReply, TransportError>;
}

/// Reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with an explicit connect timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(connect_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().connect_timeout(connect_timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<BackendReply, TransportError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");

        if let Some(cookie) = request.cookie {
            builder = builder.header(COOKIE, cookie);
        }
        if let Some(id) = request.request_id {
            builder = builder.header("x-request-id", id);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(BackendReply { status, body })
    }
}
