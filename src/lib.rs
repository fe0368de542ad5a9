pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod recommendations;
pub mod scanner;
pub mod sessions;
mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, LevelFilter};
use tokio_util::sync::CancellationToken;

use config::AppConfig;
use db::Database;
use recommendations::{RecommendationConfig, RecommendationEngine};
use scanner::LocalScanner;
use sessions::SessionTracker;

/// Shared handles for the HTTP handlers. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tracker: SessionTracker,
    pub engine: RecommendationEngine,
    pub scanner: Arc<LocalScanner>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let db = Database::new(config.db_path.clone())?;
        Ok(Self {
            tracker: SessionTracker::new(db.clone()),
            engine: RecommendationEngine::new(db.clone(), RecommendationConfig::default()),
            scanner: Arc::new(LocalScanner::new(config.scan_paths.clone())),
            db,
        })
    }
}

pub async fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    utils::logging::init(LevelFilter::Info);

    info!("gameshelf starting up...");

    let config = AppConfig::from_env()?;
    let state = AppState::new(&config)?;
    info!(
        "Local scan covers {} configured path(s)",
        state.scanner.roots().len()
    );

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("Listening on http://{}", config.bind_addr);

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {err}");
                return;
            }
            info!("Shutdown requested");
            shutdown.cancel();
        });
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("HTTP server failed")?;

    info!("gameshelf stopped");
    Ok(())
}
