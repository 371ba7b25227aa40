//! Options scanner server and one-shot CLI.

use anyhow::Context;
use clap::Parser;
use options_scanner::api::rest::{AnalyzeBody, AppState, ErrorResponse, create_router};
use options_scanner::bootstrap::build_engine;
use options_scanner::config::ScannerConfig;
use options_scanner::logging::{LogFormat, init_logging};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Exit code of `--once` when the run could not complete.
const EXIT_UNAVAILABLE: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "options-scanner")]
#[command(about = "Chartink scan aggregator ranked for NSE F&O swing trades", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML config file (defaults to ./scanner.toml if present)
    #[arg(long, short, env = "SCANNER_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address override
    #[arg(long)]
    host: Option<String>,

    /// Listen port override
    #[arg(long, short)]
    port: Option<u16>,

    /// Log format override (pretty, json, compact)
    #[arg(long)]
    log_format: Option<LogFormat>,

    /// Run one analysis, print the JSON body to stdout and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config =
        ScannerConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    init_logging(&config.logging).context("initializing logging")?;

    let engine = Arc::new(build_engine(&config).context("building analysis engine")?);

    if cli.once {
        return run_once(&engine).await;
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, queries = config.scan.queries.len(), "Options scanner listening");

    let app = create_router(Arc::new(AppState::new(engine)));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("Server stopped");
    Ok(ExitCode::SUCCESS)
}

async fn run_once(
    engine: &options_scanner::application::services::analysis::AnalysisEngine,
) -> anyhow::Result<ExitCode> {
    match engine.run().await {
        Ok(outcome) => {
            let body = AnalyzeBody::from(&outcome);
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(error = %e, "Analysis failed");
            let body = ErrorResponse {
                status: "error".to_string(),
                message: e.to_string(),
            };
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(ExitCode::from(EXIT_UNAVAILABLE))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => warn!("Received Ctrl+C, shutting down"),
        () = terminate => warn!("Received SIGTERM, shutting down"),
    }
}
