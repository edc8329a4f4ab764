//! Timetable HTTP Server Binary
//!
//! Starts the background refresh loop and serves the REST API.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin timetable-server
//!
//! # With an explicit configuration file
//! TIMETABLE_CONFIG=/etc/timetable.toml cargo run --bin timetable-server
//! ```
//!
//! # Environment Variables
//!
//! - `TIMETABLE_CONFIG`: Path to a TOML configuration file (default: search
//!   `timetable.toml`, `backend/timetable.toml`, `../timetable.toml`)
//! - `HOST`: Server host, overrides `[server] host`
//! - `PORT`: Server port, overrides `[server] port`
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use timetable_cache::config::AppConfig;
use timetable_cache::db::{EntityRegistry, ScheduleCache};
use timetable_cache::http::{create_router, AppState};
use timetable_cache::services::{RefreshTracker, Refresher};
use timetable_cache::source::HttpDocumentSource;

fn load_config() -> anyhow::Result<AppConfig> {
    let mut config = match env::var("TIMETABLE_CONFIG") {
        Ok(path) => {
            info!("Loading configuration from {}", path);
            AppConfig::from_file(&path)?
        }
        Err(_) => AppConfig::from_default_location()?.unwrap_or_else(|| {
            info!("No configuration file found, using defaults");
            AppConfig::default()
        }),
    };

    if let Ok(host) = env::var("HOST") {
        config.server.host = host;
    }
    if let Some(port) = env::var("PORT").ok().and_then(|s| s.parse().ok()) {
        config.server.port = port;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting timetable server");

    let config = load_config()?;

    let cache = Arc::new(ScheduleCache::new());
    let registry = Arc::new(EntityRegistry::new());
    let tracker = RefreshTracker::new();

    let source = HttpDocumentSource::from_settings(&config.source)?;
    let refresher = Arc::new(Refresher::new(
        Arc::new(source),
        Arc::clone(&cache),
        Arc::clone(&registry),
        tracker.clone(),
        config.source.clone(),
    ));
    let _refresh_task = refresher.spawn();
    info!(
        "Refreshing weeks {}..={} every {} s from {}",
        config.source.first_week,
        config.source.last_week,
        config.source.sweep_interval_secs,
        config.source.url_template
    );

    let state = AppState::new(cache, registry, tracker);
    let app = create_router(state, &config.server.allowed_origins);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
