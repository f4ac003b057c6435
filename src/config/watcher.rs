//! Configuration file watcher for hot reload.
//!
//! Only the backend target (base URL, per-call timeout) is live-reloadable.
//! Listener, observability, request deadline, body limit and connect timeout
//! changes are logged and need a restart.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GatewayConfig;

/// Watches the gateway config file and publishes changed configurations.
pub struct ConfigWatcher {
    path: PathBuf,
    current: GatewayConfig,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// Create a watcher seeded with the configuration already in use.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(
        path: &Path,
        current: GatewayConfig,
    ) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            current,
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching the file in a background thread.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            current,
            update_tx,
        } = self;
        let last = Mutex::new(current);
        let reload_path = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    let Ok(mut last) = last.lock() else {
                        return;
                    };
                    if let Some(next) = reload(&reload_path, &last) {
                        *last = next.clone();
                        let _ = update_tx.send(next);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}

/// Reload the file and return it when it differs from `last`.
///
/// Invalid files are logged and the current configuration stays in effect.
fn reload(path: &Path, last: &GatewayConfig) -> Option<GatewayConfig> {
    let next = match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
            return None;
        }
    };

    if next == *last {
        return None;
    }
    let pending = restart_only_changes(last, &next);
    if !pending.is_empty() {
        tracing::warn!(settings = ?pending, "Some changes take effect after a restart");
    }
    tracing::info!(base_url = %next.backend.base_url, "Configuration reloaded");
    Some(next)
}

/// Settings that differ between `last` and `next` but are fixed at startup.
fn restart_only_changes(last: &GatewayConfig, next: &GatewayConfig) -> Vec<&'static str> {
    let mut changed = Vec::new();
    if next.listener != last.listener {
        changed.push("listener");
    }
    if next.observability != last.observability {
        changed.push("observability");
    }
    if next.timeouts != last.timeouts {
        changed.push("timeouts");
    }
    if next.security != last.security {
        changed.push("security");
    }
    if next.backend.connect_timeout_secs != last.backend.connect_timeout_secs {
        changed.push("backend.connect_timeout_secs");
    }
    changed
}
