//! Xtream Codes API Client
//!
//! HTTP client for the live stream listing of the Xtream Codes Player API v2.

use super::types::{InvalidServerUrl, XtreamCredentials, XtreamLiveStream};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::models::{Playlist, XTREAM_PLAYLIST_NAME};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Xtream API Error types
#[derive(Debug, thiserror::Error)]
pub enum XtreamError {
    /// Any failure while building the request, talking to the server or
    /// decoding its answer. The cause is kept as an opaque source.
    #[error("{message}")]
    Fetch {
        message: String,
        #[source]
        source: BoxError,
    },
    /// The client was used after [`XtreamClient::close`]
    #[error("Xtream client is closed")]
    Closed,
}

impl XtreamError {
    fn fetch(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        XtreamError::Fetch {
            message: message.into(),
            source: source.into(),
        }
    }
}

/// Non-2xx answer from the server
#[derive(Debug, thiserror::Error)]
#[error("HTTP error: {0}")]
struct UnexpectedStatus(u16);

/// Transport settings for [`XtreamClient`]
#[derive(Debug, Clone, Default)]
pub struct XtreamClientOptions {
    /// Whole-request timeout; `None` keeps the transport default
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
    /// Many Xtream servers run with self-signed certificates
    pub accept_invalid_certs: bool,
}

impl XtreamClientOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.xtream_timeout_ms.map(Duration::from_millis),
            user_agent: Some(config.user_agent.clone()),
            accept_invalid_certs: config.xtream_accept_invalid_certs,
        }
    }
}

/// Xtream API Client
///
/// Safe to share between tasks; every call is an independent request.
/// Call [`close`](Self::close) once the client is no longer needed. Requests
/// already in flight finish normally, later ones fail with
/// [`XtreamError::Closed`].
pub struct XtreamClient {
    credentials: XtreamCredentials,
    http: Mutex<Option<Client>>,
}

impl XtreamClient {
    /// Create a new Xtream client with transport defaults
    ///
    /// # Arguments
    /// * `server` - Server base URL (e.g., "http://example.com:8080")
    /// * `username` - Xtream username
    /// * `password` - Xtream password
    pub fn new(server: &str, username: &str, password: &str) -> Result<Self, XtreamError> {
        Self::with_options(
            XtreamCredentials::new(server, username, password),
            &XtreamClientOptions::default(),
        )
    }

    /// Create from credentials struct
    pub fn from_credentials(
        creds: &XtreamCredentials,
        options: &XtreamClientOptions,
    ) -> Result<Self, XtreamError> {
        Self::with_options(creds.clone(), options)
    }

    pub fn with_options(
        credentials: XtreamCredentials,
        options: &XtreamClientOptions,
    ) -> Result<Self, XtreamError> {
        let mut builder = Client::builder().danger_accept_invalid_certs(options.accept_invalid_certs);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &options.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        let http = builder
            .build()
            .map_err(|e| XtreamError::fetch("Failed to create HTTP client", e))?;

        Ok(Self {
            credentials,
            http: Mutex::new(Some(http)),
        })
    }

    pub fn credentials(&self) -> &XtreamCredentials {
        &self.credentials
    }

    /// Handle to the shared transport, or `Closed`
    fn http(&self) -> Result<Client, XtreamError> {
        self.http
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(XtreamError::Closed)
    }

    /// Make a GET request to player_api.php for `action` and decode the body
    async fn get<T: DeserializeOwned>(&self, action: &str) -> Result<T, XtreamError> {
        let http = self.http()?;
        let context = format!("Failed to fetch {}", action);

        let url = self
            .credentials
            .api_url(action)
            .map_err(|e| XtreamError::fetch(format!("{}: {}", context, e), e))?;

        debug!("Xtream API request: {} on {}", action, self.credentials.server);

        let response = http
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(&context, e))?;

        let status = response.status();
        if !status.is_success() {
            let cause = UnexpectedStatus(status.as_u16());
            return Err(XtreamError::fetch(format!("{}: {}", context, cause), cause));
        }

        let text = response
            .text()
            .await
            .map_err(|e| transport_error(&context, e))?;

        serde_json::from_str(&text).map_err(|e| {
            error!(
                "Failed to parse Xtream response for action '{}': {}",
                action, e
            );
            debug!("Response text: {}", truncate(&text, 500));
            XtreamError::fetch(format!("{}: invalid response: {}", context, e), e)
        })
    }

    // ========================================================================
    // Live Streams
    // ========================================================================

    /// Get all live streams as a playlist, in server order
    pub async fn get_live_streams(&self) -> Result<Playlist, XtreamError> {
        let streams: Vec<XtreamLiveStream> = self.get("get_live_streams").await?;

        let channels = streams
            .into_iter()
            .map(|stream| {
                self.credentials
                    .live_url(stream.stream_id)
                    .map(|url| stream.into_channel(url))
            })
            .collect::<Result<Vec<_>, InvalidServerUrl>>()
            .map_err(|e| XtreamError::fetch(format!("Failed to build stream URL: {}", e), e))?;

        info!(
            "Fetched {} live streams from {}",
            channels.len(),
            self.credentials.server
        );

        Ok(Playlist::new(XTREAM_PLAYLIST_NAME, channels))
    }

    /// Release the HTTP transport. Later calls are no-ops.
    pub fn close(&self) {
        let released = self
            .http
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if released.is_some() {
            debug!("Xtream client closed for {}", self.credentials.server);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.http
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// Wrap a transport error, dropping the request URL since it carries the password
fn transport_error(context: &str, e: reqwest::Error) -> XtreamError {
    let e = e.without_url();
    XtreamError::fetch(format!("{}: {}", context, e), e)
}

/// Cut `text` to at most `max` bytes on a char boundary
fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
