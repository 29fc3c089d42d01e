// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printgate — HTTP label/document print gateway
//
// Entry point. Initialises logging, loads and validates the configuration,
// wires the job orchestrator and serves the print endpoint until Ctrl-C.

mod form;
mod server;
mod services;

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use printgate_core::error::{PrintgateError, Result};
use printgate_core::GatewayConfig;

use server::AppState;
use services::orchestrator::JobOrchestrator;

/// Command line options.
#[derive(Debug, Parser)]
#[command(name = "printgate", version, about = "HTTP print gateway")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(long, env = "PRINTGATE_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Directory holding the wkhtmltopdf and Ghostscript binaries.
    #[arg(long, env = "PRINTGATE_BIN_DIR")]
    bin_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "printgate stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!(config = %cli.config.display(), "printgate starting");

    let mut config = GatewayConfig::load(&cli.config)?;
    if let Some(bin_dir) = cli.bin_dir {
        config = config.with_bin_dir(bin_dir);
    }
    config.ensure_temp_dir()?;
    let port = config.port()?;
    let max_body = config.max_request_bytes;
    info!(
        bin_dir = %config.bin_dir.display(),
        temp_dir = %config.temp_dir.display(),
        templates_dir = %config.templates_dir.display(),
        "paths resolved"
    );

    let config = Arc::new(config);
    let state = AppState {
        orchestrator: Arc::new(JobOrchestrator::from_config(config)),
    };
    let app = server::router(state, max_body);

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        PrintgateError::Config(format!("unable to listen on {addr}: {e}"))
    })?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("printgate stopped cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
