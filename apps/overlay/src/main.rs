mod config;
mod display;
mod errors;
mod feed;
mod layout;
mod routes;
mod settings;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tokio::runtime::Handle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting overlay v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Fit bounds {}..={} px, debounce {:?}, viewport {}x{}",
        config.fit_bounds.min_size,
        config.fit_bounds.max_size,
        config.fit_debounce,
        config.viewport.width,
        config.viewport.height
    );

    let overlay = AppState::build(config.clone(), Handle::current())?;

    // Feed client runs until the URL sender in AppState is dropped
    let feed = tokio::spawn(overlay.feed.run());
    info!("Feed client started ({})", config.feed_url);

    let app = build_router(overlay.state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // display pages are served from other origins

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    // Tear down resize observation before the runtime goes away
    drop(overlay.observation);
    feed.abort();

    Ok(())
}
