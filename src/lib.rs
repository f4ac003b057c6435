//! Society management request gateway library.

pub mod config;
pub mod forward;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resources;

pub use config::GatewayConfig;
pub use forward::{Forwarder, ForwardRequest, ForwardResponse};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
