//! metadata-mcp - Main entry point
//!
//! MCP server exposing media metadata lookups (TMDB, ThePornDB, Metatube,
//! Wikipedia, DuckDuckGo, URL fetch) and the actor alias directory over
//! streamable HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use metadata_common::Config;
use metadata_mcp::alias::AliasStore;
use metadata_mcp::{build_registry, build_router, AppState};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for metadata-mcp
#[derive(Parser, Debug)]
#[command(name = "metadata-mcp")]
#[command(about = "Media metadata MCP server")]
#[command(version)]
struct Args {
    /// TOML configuration file; environment variables are used when absent
    #[arg(short, long, env = "METADATA_MCP_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the configured port)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }

    // RUST_LOG wins over the configured level
    let default_filter = format!(
        "metadata_mcp={0},metadata_common={0},tower_http=info",
        config.logging.level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting metadata-mcp v{} on port {}", env!("CARGO_PKG_VERSION"), config.port);

    let alias_store = AliasStore::new(config.alias_file());
    if alias_store
        .ensure_exists()
        .await
        .context("Failed to prepare actor alias file")?
    {
        info!("Created empty actor alias file {}", alias_store.path().display());
    }

    let registry = build_registry(&config).context("Failed to initialize tools")?;
    info!("Registered {} tools", registry.len());

    let shutdown = CancellationToken::new();
    let app = build_router(AppState::new(registry, shutdown.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM, then cancel in-flight tool calls
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
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

    shutdown.cancel();
}
