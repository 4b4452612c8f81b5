//! Marquee - a read-only movie catalog HTTP API
//!
//! Marquee serves a movie catalog from a SQLite database over HTTP, lazily
//! attaching a second ratings database to join aggregate scores into the
//! detail endpoint.

use anyhow::Result;
use tracing::{error, info};

mod api;
mod config;
mod db;
mod utils;

use api::AppState;
use config::Settings;
use db::Database;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marquee=info,tower_http=info".into()),
        )
        .init();

    info!("Starting Marquee v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let settings = Settings::load()?;
    if let Some(path) = settings.config_path() {
        info!("Configuration loaded from {:?}", path);
    }

    // Open the movie catalog; without it there is nothing to serve
    let db = match Database::open(
        &settings.database.movies_path,
        &settings.database.ratings_path,
    ) {
        Ok(db) => db,
        Err(err) => {
            error!("Failed to open movies database: {:#}", err);
            return Err(err);
        }
    };
    info!(
        "Movies database opened at {:?}",
        settings.database.movies_path
    );

    // Create application state
    let state = AppState::new(db, settings.clone());

    // Build router
    let app = api::create_router(state);

    // Start server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
