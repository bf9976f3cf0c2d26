use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::{api_error, ApiError};
use crate::models::{LoadRequest, ParseRequest, Playlist, DEFAULT_M3U_PLAYLIST_NAME};
use crate::routes::xtream::fetch_live_playlist;
use crate::services::{m3u_export, m3u_parser, xtream::extract_credentials};
use crate::AppState;

/// POST /api/playlist/parse - Parse M3U text sent in the request body
pub async fn parse_playlist(Json(payload): Json<ParseRequest>) -> impl IntoResponse {
    let name = payload.name.as_deref().unwrap_or(DEFAULT_M3U_PLAYLIST_NAME);
    Json(m3u_parser::parse_with_name(&payload.content, name))
}

/// POST /api/playlist/load - Load a playlist from a URL
/// Xtream `get.php` links are read through the Player API instead of the M3U export
pub async fn load_playlist(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate URL
    if payload.url.is_empty() || !payload.url.starts_with("http") {
        return Err(api_error(StatusCode::BAD_REQUEST, "Invalid URL"));
    }

    if let Some(creds) = extract_credentials(&payload.url) {
        tracing::info!("Xtream URL detected for {}, using Player API", creds.server);
        let mut playlist = fetch_live_playlist(&state, &creds).await?;
        if let Some(name) = payload.name {
            playlist.name = name;
        }
        return Ok(Json(playlist));
    }

    let playlist = state
        .loader
        .load_url(&payload.url, payload.name.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Playlist load failed: {:#}", e);
            api_error(StatusCode::BAD_GATEWAY, format!("{:#}", e))
        })?;

    Ok(Json(playlist))
}

/// POST /api/playlist/export - Render a playlist as M3U text
pub async fn export_playlist(Json(playlist): Json<Playlist>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "audio/x-mpegurl")],
        m3u_export::to_m3u(&playlist),
    )
}
