//! Xtream Codes Integration
//!
//! Live stream listing through the Xtream Codes Player API v2.
//!
//! # Overview
//!
//! - **Detection**: Identify Xtream panels from M3U playlist URLs
//! - **API Client**: Fetch live streams as a [`Playlist`](crate::models::Playlist)
//!
//! # Endpoints
//!
//! ```text
//! http://server:port/player_api.php?username=X&password=Y&action=get_live_streams
//! http://server:port/live/X/Y/<stream_id>.m3u8
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use suptv_server::services::xtream::XtreamClient;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = XtreamClient::new("http://example.com:8080", "user", "pass")?;
//! let playlist = client.get_live_streams().await?;
//! client.close();
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod detector;
pub mod types;

// Re-exports for convenience
pub use client::{XtreamClient, XtreamClientOptions, XtreamError};
pub use detector::extract_credentials;
pub use types::{InvalidServerUrl, XtreamCredentials, XtreamLiveStream};
