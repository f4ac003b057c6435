//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with every forwarder endpoint
//! - Wire up middleware (request ID, tracing, body limit)
//! - Bound each backend call by the request deadline
//! - Bind server to listener
//! - Apply backend target reloads between requests
//! - Stop on the shutdown signal, draining in-flight calls

use arc_swap::ArcSwap;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::forward::{BackendTarget, Forwarder, ReqwestTransport, Transport, TransportError};
use crate::http::handlers::{collection, health, member};
use crate::http::request::UuidRequestId;
use crate::lifecycle::shutdown;
use crate::resources::{complaints, employees, events, payments, residents};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
    /// Live backend target; handlers take a snapshot per call.
    pub target: Arc<ArcSwap<BackendTarget>>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    target: Arc<ArcSwap<BackendTarget>>,
}

impl HttpServer {
    /// Create a server that forwards over a reqwest transport.
    pub fn new(config: GatewayConfig) -> Result<Self, TransportError> {
        let connect_timeout = Duration::from_secs(config.backend.connect_timeout_secs);
        let transport = ReqwestTransport::new(connect_timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a server over any transport.
    pub fn with_transport(
        config: GatewayConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, TransportError> {
        let target = Arc::new(ArcSwap::from_pointee(BackendTarget::from_config(&config.backend)?));
        let state = AppState {
            forwarder: Arc::new(
                Forwarder::new(transport)
                    .with_deadline(Duration::from_secs(config.timeouts.request_secs)),
            ),
            target: target.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            target,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/healthz", get(health))
            .route(
                "/api/admin/employees",
                get(collection(&employees::LIST)).post(collection(&employees::CREATE)),
            )
            .route(
                "/api/admin/residents",
                get(collection(&residents::LIST)).post(collection(&residents::CREATE)),
            )
            .route("/api/admin/residents/{id}", delete(member(&residents::DELETE)))
            .route(
                "/api/admin/payments",
                get(collection(&payments::LIST)).post(collection(&payments::CREATE_BILL)),
            )
            .route("/api/admin/payments/{id}", put(member(&payments::MARK_PAID)))
            .route(
                "/api/resident/complaints",
                get(collection(&complaints::LIST)).post(collection(&complaints::CREATE)),
            )
            .route("/api/resident/events", post(collection(&events::BOOK)))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(DefaultBodyLimit::max(config.security.max_body_size)),
            )
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configurations received on `config_updates` replace the backend target.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.target.load().base_url,
            "HTTP server starting"
        );

        let target = self.target.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                match BackendTarget::from_config(&config.backend) {
                    Ok(next) => {
                        tracing::info!(backend = %next.base_url, "Backend target updated");
                        target.store(Arc::new(next));
                    }
                    Err(e) => tracing::error!(error = %e, "Ignoring invalid backend target"),
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
