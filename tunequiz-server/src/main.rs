//! tunequiz-server - song-clip guessing game service
//!
//! Resolves a guessable song for a language, prepares a clip of it in the
//! background, and serves round status, clip audio, guesses and reveals
//! over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tunequiz_common::config::load_toml_config;
use tunequiz_server::config::ServiceSettings;
use tunequiz_server::{build_router, AppState, Collaborators};

/// Command-line arguments for tunequiz-server
#[derive(Parser, Debug)]
#[command(name = "tunequiz-server")]
#[command(about = "Song-clip guessing game server")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "TUNEQUIZ_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides config file)
    #[arg(short, long, env = "TUNEQUIZ_BIND")]
    bind: Option<String>,

    /// Config file path (default: ~/.config/tunequiz/config.toml)
    #[arg(short, long, env = "TUNEQUIZ_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before the subscriber exists so its level can seed the filter
    let toml_config = load_toml_config(args.config.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| toml_config.logging.filter_directive().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting tunequiz-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let settings = ServiceSettings::resolve(&toml_config);
    tokio::fs::create_dir_all(&settings.scratch_dir)
        .await
        .with_context(|| format!("Failed to create scratch directory {}", settings.scratch_dir.display()))?;
    info!("Scratch directory: {}", settings.scratch_dir.display());

    let collaborators = Collaborators::from_settings(&settings)
        .context("Failed to initialize external clients")?;
    let state = AppState::new(&settings, collaborators);
    let app = build_router(state);

    let bind = args.bind.unwrap_or(toml_config.bind_address);
    let port = args.port.unwrap_or(toml_config.port);
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
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
