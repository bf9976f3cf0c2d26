//! Xtream Codes Routes
//!
//! Fetch the live stream list of an Xtream account and hand it back as a
//! playlist.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use super::{api_error, ApiError};
use crate::models::{Playlist, XtreamLiveRequest};
use crate::services::xtream::{XtreamClient, XtreamClientOptions, XtreamCredentials};
use crate::AppState;

/// Fetch live streams with a short-lived client, closing it afterwards
pub(crate) async fn fetch_live_playlist(
    state: &AppState,
    creds: &XtreamCredentials,
) -> Result<Playlist, ApiError> {
    let options = XtreamClientOptions::from_config(&state.config);
    let client = XtreamClient::from_credentials(creds, &options).map_err(|e| {
        tracing::error!("Failed to create Xtream client: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    })?;

    let result = client.get_live_streams().await;
    client.close();

    result.map_err(|e| {
        tracing::error!("Xtream API error: {}", e);
        api_error(StatusCode::BAD_GATEWAY, format!("Xtream API error: {}", e))
    })
}

/// POST /api/xtream/live
pub async fn get_live_streams(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<XtreamLiveRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.server.is_empty() || !payload.server.starts_with("http") {
        return Err(api_error(StatusCode::BAD_REQUEST, "Invalid server URL"));
    }

    let creds = XtreamCredentials::new(payload.server, payload.username, payload.password);
    let playlist = fetch_live_playlist(&state, &creds).await?;

    Ok(Json(playlist))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::post_json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_live_streams_route() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/player_api.php"))
            .and(query_param("action", "get_live_streams"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"[{"name":"CNN","stream_id":101,"category_id":"News"}]"#),
            )
            .mount(&server)
            .await;

        let (status, body) = post_json(
            "/api/xtream/live",
            serde_json::json!({"server": server.uri(), "username": "u", "password": "p"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let playlist: Playlist = serde_json::from_slice(&body).unwrap();
        assert_eq!(playlist.name, "XStream Playlist");
        assert_eq!(playlist.channels[0].url, format!("{}/live/u/p/101.m3u8", server.uri()));
    }

    #[tokio::test]
    async fn test_live_streams_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let (status, body) = post_json(
            "/api/xtream/live",
            serde_json::json!({"server": server.uri(), "username": "u", "password": "p"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(error["error"].as_str().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_live_streams_rejects_bad_server() {
        let (status, _) = post_json(
            "/api/xtream/live",
            serde_json::json!({"server": "ftp://x", "username": "u", "password": "p"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
