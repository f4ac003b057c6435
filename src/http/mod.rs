//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, cookie, JSON body)
//!     → handlers.rs (descriptor-specialised dispatch)
//!     → forward (validate, call backend, normalize)
//!     → JSON envelope back to the caller
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
