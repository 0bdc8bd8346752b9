//! Performance Store (callboard-store) - Main entry point
//!
//! The authoritative record keeper for events and performances, and the
//! broadcast relay connecting every console working the same event.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use callboard_store::api::{self, AppContext};
use callboard_store::db;
use callboard_store::sse::SseBroadcaster;

/// Command-line arguments for callboard-store
#[derive(Parser, Debug)]
#[command(name = "callboard-store")]
#[command(about = "Performance store and broadcast relay for Callboard")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5780", env = "CALLBOARD_STORE_PORT")]
    port: u16,

    /// SQLite database URL
    #[arg(
        short,
        long,
        default_value = "sqlite://callboard.db?mode=rwc",
        env = "CALLBOARD_DB_URL"
    )]
    db_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "callboard_store=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting Callboard performance store on port {}", args.port);
    info!("Database: {}", args.db_url);

    let db_pool = db::init::open_pool(&args.db_url)
        .await
        .context("Failed to open store database")?;

    let ctx = AppContext {
        db_pool,
        broadcaster: SseBroadcaster::new(100),
    };

    let app = api::create_router(ctx);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], args.port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Performance store listening on {}", addr);

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
