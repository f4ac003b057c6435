//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! forward + http layers produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout log stream
//!     → Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the inbound header to the backend call
//! - The Prometheus exporter only starts when `metrics_enabled` is set

pub mod logging;
pub mod metrics;
