//! HTTP API layer

mod error;
pub mod handlers;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::Settings;
use crate::db::catalog::CatalogStore;
use crate::db::Database;

pub use error::AppError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub catalog: Arc<CatalogStore>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        let catalog = Arc::new(CatalogStore::new(db.clone()));

        Self {
            db,
            settings,
            catalog,
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Movie catalog
        .route("/movies", get(handlers::movies::list))
        .route("/movies/{id}", get(handlers::movies::details))
        .route("/movies/year/{year}", get(handlers::movies::by_year))
        .route("/movies/genre/{genre}", get(handlers::movies::by_genre));

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}
