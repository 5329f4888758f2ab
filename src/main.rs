//! Forward HTTP proxy.
//!
//! ```text
//!     Client ──▶ net::listener ──▶ proxy::handler ──▶ http (parse, resolve)
//!                                        │
//!                                        ▼
//!     Client ◀── proxy::relay ◀── proxy::forward ◀──▶ Upstream server
//! ```
//!
//! Diagnostic lines go to stdout, logs to stderr.

use std::path::PathBuf;

use clap::Parser;

use forward_proxy::lifecycle::{self, StartupOptions};

#[derive(Parser, Debug)]
#[command(name = "forward-proxy")]
#[command(about = "Forward HTTP proxy for plaintext GET requests", long_about = None)]
struct Cli {
    /// Port to listen on (overrides listener.port)
    #[arg(short, long)]
    port: Option<u16>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload the configuration file when it changes
    #[arg(long)]
    watch: bool,

    /// Log filter, e.g. `debug` or `forward_proxy=trace,tokio=info`
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    lifecycle::run(StartupOptions {
        config_path: cli.config,
        port: cli.port,
        watch: cli.watch,
        log_level: cli.log_level,
    })
    .await
}
