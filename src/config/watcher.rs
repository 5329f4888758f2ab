//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::loader::load_config;
use crate::config::schema::ProxyConfig;
use crate::config::SharedConfig;

/// A watcher that monitors the configuration file for changes.
///
/// Valid new configurations are swapped into the shared handle; connections
/// accepted afterwards see them, connections in flight keep their snapshot.
pub struct ConfigWatcher {
    path: PathBuf,
    shared: SharedConfig,
    file_config: ProxyConfig,
}

impl ConfigWatcher {
    /// `file_config` is the file as loaded at startup, before any
    /// command-line overrides.
    pub fn new(path: &Path, shared: SharedConfig, file_config: ProxyConfig) -> Self {
        Self {
            path: path.to_path_buf(),
            shared,
            file_config,
        }
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for watching to continue.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();
        let shared = self.shared.clone();
        let mut file_config = self.file_config;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Config file change detected, reloading...");
                        reload(&path, &shared, &mut file_config);
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Load `path` and swap it in if valid. Returns whether a swap happened.
///
/// `file_config` holds the previous contents of the file and is updated on
/// success.
pub fn reload(path: &Path, shared: &SharedConfig, file_config: &mut ProxyConfig) -> bool {
    match load_config(path) {
        Ok(new_config) => {
            apply(shared, file_config, new_config);
            true
        }
        Err(e) => {
            tracing::error!(
                "Failed to reload config: {}. Keeping current configuration.",
                e
            );
            false
        }
    }
}

/// Swap in `new_config`, keeping the listener and observability settings in
/// effect.
///
/// Changes are detected against the previous file contents, so startup
/// overrides never count as edits. Returns true if the file changed a
/// section that only applies after a restart.
pub fn apply(
    shared: &SharedConfig,
    file_config: &mut ProxyConfig,
    mut new_config: ProxyConfig,
) -> bool {
    let mut restart_needed = false;
    if new_config.listener != file_config.listener {
        tracing::warn!("Listener settings cannot change at runtime; ignoring them until restart");
        restart_needed = true;
    }
    if new_config.observability != file_config.observability {
        tracing::warn!("Observability settings take effect on restart");
        restart_needed = true;
    }
    *file_config = new_config.clone();

    let current = shared.load();
    new_config.listener = current.listener.clone();
    new_config.observability = current.observability.clone();
    shared.store(Arc::new(new_config));
    tracing::info!("Configuration reloaded");
    restart_needed
}
