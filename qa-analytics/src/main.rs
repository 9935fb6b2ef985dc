//! qa-analytics - QA report analytics service
//!
//! Serves developer, summary, sprint error and release analytics computed
//! on every request from the report database in the root folder.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use qa_analytics::store::SqliteReportStore;
use qa_analytics::{build_router, AppState};
use qa_common::config::{database_path, resolve_root_folder, TomlConfig, ROOT_FOLDER_ENV};
use qa_common::db::init_database;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_QUERY_TIMEOUT_MS: u64 = 10_000;

/// Command-line arguments for qa-analytics
#[derive(Parser, Debug)]
#[command(name = "qa-analytics")]
#[command(about = "QA report analytics service")]
#[command(version)]
struct Args {
    /// Port to listen on [default: 3001]
    #[arg(short, long, env = "QA_ANALYTICS_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Root folder holding qa-report.db
    #[arg(short, long, env = "QA_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Per-query store timeout in milliseconds [default: 10000]
    #[arg(long, env = "QA_QUERY_TIMEOUT_MS")]
    query_timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qa_analytics=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting QA Analytics (qa-analytics) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let toml_config = TomlConfig::load();

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), ROOT_FOLDER_ENV, toml_config.as_ref());
    let port = args
        .port
        .or(toml_config.as_ref().and_then(|c| c.port))
        .unwrap_or(DEFAULT_PORT);
    let query_timeout = Duration::from_millis(
        args.query_timeout_ms
            .or(toml_config.as_ref().and_then(|c| c.query_timeout_ms))
            .unwrap_or(DEFAULT_QUERY_TIMEOUT_MS),
    );

    let db_path = database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open report database {}", db_path.display()))?;

    let store = SqliteReportStore::new(pool, query_timeout);
    info!(timeout_ms = query_timeout.as_millis() as u64, "Report store ready");

    let app = build_router(AppState::new(Arc::new(store)));

    let addr: SocketAddr = format!("{}:{}", args.bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", args.bind, port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("qa-analytics listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
///
/// A handler that fails to install never fires; the other one still can.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
