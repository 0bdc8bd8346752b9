//! Callboard console - Main entry point
//!
//! Headless console session: connects to a performance store, mirrors one
//! event's running order for the selected role, and logs replica changes
//! and operator notices. Rendering is someone else's job; this binary is
//! the sync engine on its own.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use callboard_console::bus::HttpBus;
use callboard_console::store::HttpStore;
use callboard_console::{Console, ConsoleRole};

/// Command-line arguments for callboard-console
#[derive(Parser, Debug)]
#[command(name = "callboard-console")]
#[command(about = "Event console for the Callboard running-order system")]
#[command(version)]
struct Args {
    /// Which console role this session runs as
    #[arg(short, long, value_enum)]
    role: ConsoleRole,

    /// Event id to mirror
    #[arg(short, long)]
    event: Uuid,

    /// Performance store base URL
    #[arg(short, long, env = "CALLBOARD_STORE_URL")]
    store_url: Option<String>,

    /// Operator name recorded on check-ins and announcements
    #[arg(short, long, default_value = "operator")]
    operator: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "callboard_console=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let store_url = callboard_common::config::resolve_store_url(
        args.store_url.as_deref(),
        "CALLBOARD_STORE_URL",
    )
    .context("Failed to resolve store URL")?;

    info!(
        "Starting {} console for event {} against {}",
        args.role, args.event, store_url
    );

    let store = Arc::new(HttpStore::new(store_url.clone()));
    let bus = Arc::new(HttpBus::connect(store_url, args.event));
    let console = Arc::new(Console::new(
        args.role,
        args.event,
        args.operator,
        store,
        bus,
    ));

    console
        .refresh()
        .await
        .context("Initial roster fetch failed")?;
    info!("Initial roster loaded: {} items", console.snapshot().await.len());

    // log operator notices as they arrive
    let mut notices = console.subscribe_notices();
    tokio::spawn(async move {
        while let Ok(notice) = notices.recv().await {
            warn!("[notice] {:?}: {}", notice.kind, notice.message);
        }
    });

    console.run().await;
    Ok(())
}
