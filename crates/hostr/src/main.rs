//! hostr CLI - local development host.
//!
//! Serves a directory over HTTP and reloads connected browsers when files
//! change on disk.

mod error;
mod output;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hostr_config::{CliSettings, Config};
use hostr_server::{run_server, server_config_from_config};

use error::CliError;
use output::Output;

/// Serve a local directory over HTTP with automatic browser reload.
#[derive(Parser)]
#[command(name = "hostr", version, about)]
struct Cli {
    /// Directory to serve (default: current directory).
    dir: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover hostr.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Default file served for directory requests (overrides config).
    #[arg(long)]
    index: Option<String>,

    /// Enable SPA mode (fall back to the index file for unknown routes).
    #[arg(long)]
    spa: bool,

    /// Disable automatic reloading.
    #[arg(long)]
    no_reload: bool,

    /// Open the served URL in the default browser after starting.
    #[arg(long)]
    open: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // Initialize tracing with appropriate log level
    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    if let Err(err) = rt.block_on(run(cli, &output)) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

/// Resolve configuration and run the server.
async fn run(cli: Cli, output: &Output) -> Result<(), CliError> {
    let dir = cli.dir.unwrap_or_else(|| PathBuf::from("."));

    let cli_settings = CliSettings {
        host: cli.host,
        port: cli.port,
        index: cli.index,
        spa: cli.spa.then_some(true),
        live_reload_enabled: cli.no_reload.then_some(false),
    };

    let config = Config::load(&dir, cli.config.as_deref(), Some(&cli_settings))?;

    let url = format!("http://{}:{}", config.server.host, config.server.port);
    output.highlight(&format!("Hosting {} at {url}", config.root.display()));
    if config.live_reload.enabled {
        output.info("Live reload: enabled");
    } else {
        output.info("Live reload: disabled");
    }
    if config.serve.spa {
        output.info("SPA mode: enabled");
    }

    if cli.open {
        // Give the listener a moment to come up before pointing a browser
        // at it.
        let open_url = url.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            if let Err(err) = open::that(&open_url) {
                tracing::warn!(error = %err, "Failed to open browser");
            }
        });
    }

    let server_config = server_config_from_config(&config);
    run_server(server_config)
        .await
        .map_err(|e| CliError::Server(e.to_string()))?;

    Ok(())
}
