//! Kitchen flow server.
//!
//! Loads configuration (`.env` first, then the environment) and the menu, starts the
//! [`KitchenSystem`], replays the order log, and serves HTTP until Ctrl-C.

use anyhow::Context;
use kitchen_actor::telemetry::setup_tracing;
use kitchen_flow::clock::SystemClock;
use kitchen_flow::config::Config;
use kitchen_flow::http::{self, AppState};
use kitchen_flow::lifecycle::{EventLogs, KitchenSystem};
use kitchen_flow::menu;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    setup_tracing();

    let config = Config::from_env().context("reading configuration")?;
    let document = menu::load_file(&config.menu_path)
        .await
        .with_context(|| format!("loading menu from {}", config.menu_path.display()))?;
    let logs = EventLogs::open(&config)
        .await
        .context("opening event logs")?;

    let system = KitchenSystem::start(&config, document, Arc::new(SystemClock), logs)
        .await
        .context("starting kitchen system")?;

    match system.replay().await {
        Ok(summary) => info!(restored = summary.restored, "Order log replayed"),
        Err(e) => warn!(error = %e, "Order log replay failed, starting empty"),
    }

    let app = http::router(AppState::new(&system, config.menu_path.clone()));
    let listener = TcpListener::bind(("0.0.0.0", config.http_port))
        .await
        .with_context(|| format!("binding port {}", config.http_port))?;
    info!(port = config.http_port, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .context("serving HTTP")?;

    system.shutdown().await?;
    Ok(())
}
