//! Artist Profile Backend
//!
//! REST backend for artist profiles, photos and filmography, persisted entirely in an
//! object storage bucket.

mod api;
mod config;
mod errors;
mod models;
mod storage;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use storage::{Bucket, Repository};

/// How long browsers may cache a preflight response.
const CORS_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let json = config.log_json;
    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting Artist Profile Backend");
    tracing::info!("Storage backend: {:?}", config.storage_backend);
    tracing::info!("Storage path: {:?}", config.storage_path);
    tracing::info!("Public base URL: {}", config.public_base_url);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Open the bucket
    let store = storage::init_storage(&config).await?;
    let bucket = Bucket::new(store, config.public_base_url.clone());
    let repo = Arc::new(Repository::new(bucket));

    // Create application state
    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Create the application router with all routes.
///
/// The route table is built once here and never changes afterwards. Each path
/// parameter matches exactly one path segment.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration; answers OPTIONS on any path
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(CORS_MAX_AGE);

    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Artists
        .route("/api/artists", get(api::list_artists))
        .route("/api/artists", post(api::create_artist))
        .route("/api/artists/{id}", get(api::get_artist))
        .route("/api/artists/{id}", put(api::update_artist))
        .route("/api/artists/{id}", delete(api::delete_artist))
        // Photos
        .route("/api/artists/{id}/photos", get(api::list_photos))
        .route("/api/artists/{id}/photos", post(api::upload_photo))
        .route(
            "/api/artists/{id}/photos/{photo_id}",
            delete(api::delete_photo),
        )
        .route(
            "/api/artists/{id}/photos/{photo_id}/main",
            put(api::set_main_photo),
        )
        // Filmography
        .route("/api/artists/{id}/filmography", get(api::get_filmography))
        .route("/api/artists/{id}/filmography", put(api::update_filmography))
        // Export
        .route("/api/export/artists", get(api::export_artists))
        .route("/api/export/filmography", get(api::export_filmography))
        // Unknown paths and unregistered methods both answer 404
        .fallback(api::not_found)
        .method_not_allowed_fallback(api::not_found)
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

/// Resolve when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
