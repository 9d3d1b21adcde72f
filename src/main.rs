//! Restaurant Menu Backend
//!
//! An HTTP backend that serves a restaurant menu to a frontend.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                MENU BACKEND                   │
//!                      │                                               │
//!   Client Request     │  ┌─────────┐    ┌──────────┐   ┌──────────┐  │
//!   ──────────────────▶│  │  http   │───▶│ handlers │──▶│    db    │──┼──▶ MongoDB
//!                      │  │ server  │    │  (CRUD)  │   │connection│  │
//!                      │  └─────────┘    └────┬─────┘   └──────────┘  │
//!                      │                      │                        │
//!                      │                      ▼                        │
//!                      │            ┌──────────────────┐              │
//!   Client Response    │            │       menu       │              │
//!   ◀──────────────────┼────────────│ normalize/format │              │
//!                      │            │  + file fallback │              │
//!                      │            └──────────────────┘              │
//!                      │                                               │
//!                      │  ┌─────────────────────────────────────────┐ │
//!                      │  │          Cross-Cutting Concerns          │ │
//!                      │  │  ┌────────┐ ┌───────────┐ ┌───────────┐  │ │
//!                      │  │  │ config │ │  tracing  │ │  metrics  │  │ │
//!                      │  │  └────────┘ └───────────┘ └───────────┘  │ │
//!                      │  └─────────────────────────────────────────┘ │
//!                      └──────────────────────────────────────────────┘
//! ```
//!
//! Data source resolution: MongoDB when `MONGODB_URI` is set (with retrying
//! connection management and collection auto-discovery), otherwise a static
//! JSON fallback file served verbatim.

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use menu_backend::config::{env::mask_uri, Config};
use menu_backend::http::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "menu_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("menu-backend v0.1.0 starting");

    let config = Config::from_env();

    tracing::info!(
        port = config.port,
        database_configured = !config.mongodb_uri.is_empty(),
        mongodb_uri = %mask_uri(&config.mongodb_uri),
        db_name = %config.db_name,
        collection = %config.collection,
        "Configuration loaded"
    );

    // Metrics exporter is opt-in via METRICS_ADDR
    if !config.metrics_address.is_empty() {
        if let Ok(addr) = config.metrics_address.parse() {
            menu_backend::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    let server = HttpServer::new(config);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
