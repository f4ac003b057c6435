//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or defaults
//!     → loader.rs (parse, BACKEND_URL override)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → backend section becomes a BackendTarget snapshot
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of Arc<BackendTarget>
//!     → the next forwarded call sees the new target
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - The environment is read once at load time, never inside handlers

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{BackendConfig, GatewayConfig, ListenerConfig, ObservabilityConfig};
