//! SupTV playlist service
//!
//! Reads IPTV channel lists from M3U text and from the Xtream Codes Player
//! API, and exposes both as the same [`models::Playlist`] shape.

pub mod config;
pub mod models;
pub mod routes;
pub mod services;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::services::loader::PlaylistLoader;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub loader: PlaylistLoader,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let loader = PlaylistLoader::from_config(&config)?;
        Ok(Self {
            config,
            loader,
            start_time: Instant::now(),
        })
    }
}

/// Build the HTTP router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health endpoints
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        .route("/live", get(routes::health::live))
        // Playlist endpoints
        .route("/api/playlist/parse", post(routes::playlist::parse_playlist))
        .route("/api/playlist/load", post(routes::playlist::load_playlist))
        .route("/api/playlist/export", post(routes::playlist::export_playlist))
        // Xtream Codes endpoints
        .route("/api/xtream/live", post(routes::xtream::get_live_streams))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
