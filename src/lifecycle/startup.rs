//! Startup orchestration.
//!
//! # Responsibilities
//! - Load configuration and apply command-line overrides
//! - Initialize logging, then metrics
//! - Start the config watcher and signal listener
//! - Bind the listener and run the accept loop until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - The listener binds last (traffic only when ready)

use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::validation::validate_config;
use crate::config::watcher::ConfigWatcher;
use crate::config::{self, load_config, ConfigError, ProxyConfig};
use crate::lifecycle::signals::spawn_signal_listener;
use crate::lifecycle::Shutdown;
use crate::net::Listener;
use crate::observability::{logging, metrics, ConsoleObserver};
use crate::proxy::ProxyServer;

/// Settings taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    pub config_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub watch: bool,
    pub log_level: Option<String>,
}

/// Load the config file, or defaults when none is given.
fn load_file_config(options: &StartupOptions) -> Result<ProxyConfig, ConfigError> {
    match &options.config_path {
        Some(path) => load_config(path),
        None => Ok(ProxyConfig::default()),
    }
}

/// Apply command-line overrides to `config` and validate the result.
fn apply_overrides(
    mut config: ProxyConfig,
    options: &StartupOptions,
) -> Result<ProxyConfig, ConfigError> {
    if let Some(port) = options.port {
        config.listener.port = port;
    }
    if let Some(level) = &options.log_level {
        config.observability.log_level = level.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Resolve the effective configuration: file or defaults, then overrides.
pub fn resolve_config(options: &StartupOptions) -> Result<ProxyConfig, ConfigError> {
    apply_overrides(load_file_config(options)?, options)
}

/// Run the proxy until a shutdown signal arrives and connections drain.
pub async fn run(options: StartupOptions) -> Result<(), Box<dyn Error>> {
    let file_config = load_file_config(&options)?;
    let config = apply_overrides(file_config.clone(), &options)?;

    logging::init(&config.observability.log_level)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "forward-proxy starting");
    tracing::info!(
        port = config.listener.port,
        bind_address = ?config.listener.bind_address,
        max_connections = config.listener.max_connections,
        max_request_bytes = config.limits.max_request_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let shared = config::shared(config);

    // Held for the lifetime of the process; dropping it stops watching.
    let _watcher = match (&options.config_path, options.watch) {
        (Some(path), true) => Some(ConfigWatcher::new(path, shared.clone(), file_config).run()?),
        (None, true) => {
            tracing::warn!("--watch given without --config; nothing to watch");
            None
        }
        _ => None,
    };

    let listener = Listener::bind(&shared.load().listener).await?;

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    spawn_signal_listener(shutdown.clone());

    let server = ProxyServer::new(shared, Arc::new(ConsoleObserver));
    server.run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
