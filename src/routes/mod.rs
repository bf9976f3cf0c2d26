pub mod health;
pub mod playlist;
pub mod xtream;

use axum::{http::StatusCode, Json};

/// Error half of every handler result: status plus `{"error": "..."}`
pub type ApiError = (StatusCode, Json<serde_json::Value>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::{build_router, AppState};

    pub fn app() -> Router {
        let config = Config {
            max_retries: 0,
            fetch_timeout_ms: 5_000,
            ..Config::default()
        };
        let state = AppState::new(config).expect("state");
        build_router(Arc::new(state))
    }

    /// POST `body` as JSON and return status plus raw response body
    pub async fn post_json(uri: &str, body: serde_json::Value) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }
}
