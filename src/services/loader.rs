//! Playlist sources: local M3U files and remote M3U URLs

use anyhow::{anyhow, bail, Context, Result};
use futures::StreamExt;
use reqwest::{Client, Response, StatusCode};
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::Config;
use crate::models::{Playlist, DEFAULT_M3U_PLAYLIST_NAME};
use crate::services::m3u_parser;

/// Backoff before retry number `attempt + 1`
fn backoff(attempt: u32) -> Duration {
    let ms = (1u64 << attempt.min(16)).saturating_mul(500).min(10_000);
    Duration::from_millis(ms)
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Loads M3U text from disk or HTTP and parses it
#[derive(Clone)]
pub struct PlaylistLoader {
    client: Client,
    max_retries: u32,
    max_m3u_size_mb: usize,
}

impl PlaylistLoader {
    /// Create a new playlist loader
    pub fn new(
        user_agent: &str,
        timeout_ms: u64,
        max_retries: u32,
        max_m3u_size_mb: usize,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_millis(timeout_ms))
            .gzip(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            max_retries,
            max_m3u_size_mb,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.user_agent,
            config.fetch_timeout_ms,
            config.max_retries,
            config.max_m3u_size_mb,
        )
    }

    fn max_bytes(&self) -> u64 {
        (self.max_m3u_size_mb as u64) * 1024 * 1024
    }

    fn too_large(&self, len: u64) -> anyhow::Error {
        anyhow!(
            "Playlist too large: {:.1}MB (limit {}MB)",
            len as f64 / 1024f64 / 1024f64,
            self.max_m3u_size_mb
        )
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<Response> {
        let mut attempt = 0;

        loop {
            match self.client.get(url).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        if let Some(len) = resp.content_length() {
                            if len > self.max_bytes() {
                                return Err(self.too_large(len));
                            }
                        }
                        return Ok(resp);
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS && attempt < self.max_retries {
                        let wait = backoff(attempt);
                        tracing::warn!(
                            fetch_retry = attempt + 1,
                            reason = "429",
                            backoff_ms = wait.as_millis() as u64
                        );
                        sleep(wait).await;
                        attempt += 1;
                        continue;
                    }

                    let friendly = match status {
                        StatusCode::NOT_FOUND => "Playlist not found (404). Check the URL.".to_string(),
                        StatusCode::FORBIDDEN => {
                            "Access denied (403). The playlist may require authentication.".to_string()
                        }
                        StatusCode::TOO_MANY_REQUESTS => {
                            "Too many requests (429). The playlist server is rate limiting.".to_string()
                        }
                        _ => format!(
                            "HTTP {}: {}",
                            status.as_u16(),
                            status.canonical_reason().unwrap_or("Error")
                        ),
                    };

                    bail!("{}", friendly);
                }
                Err(err) => {
                    if attempt >= self.max_retries {
                        return Err(err.without_url().into());
                    }
                    let wait = backoff(attempt);
                    tracing::warn!(
                        fetch_retry = attempt + 1,
                        reason = "network",
                        backoff_ms = wait.as_millis() as u64
                    );
                    sleep(wait).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Stream the body, giving up as soon as it passes the size limit.
    /// Chunked responses carry no Content-Length, so the header check alone
    /// does not bound memory.
    async fn read_body(&self, response: Response) -> Result<Vec<u8>> {
        let max_bytes = self.max_bytes();
        let mut body = Vec::with_capacity(
            response.content_length().unwrap_or(0).min(max_bytes) as usize,
        );
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| e.without_url())
                .context("Failed to read playlist body")?;
            let total = (body.len() + chunk.len()) as u64;
            if total > max_bytes {
                return Err(self.too_large(total));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }

    /// Download and parse an M3U playlist
    pub async fn load_url(&self, url: &str, name: Option<&str>) -> Result<Playlist> {
        if !is_http_url(url) {
            bail!("Unsupported playlist URL (http/https only)");
        }

        tracing::info!("Loading playlist from URL");

        let response = self
            .fetch_with_retry(url)
            .await
            .context("Failed to fetch playlist")?;

        let body = self.read_body(response).await?;

        tracing::info!("Playlist size: {:.2} MB", body.len() as f64 / 1024.0 / 1024.0);

        let content = String::from_utf8_lossy(&body);
        Ok(m3u_parser::parse_with_name(
            &content,
            name.unwrap_or(DEFAULT_M3U_PLAYLIST_NAME),
        ))
    }

    /// Read and parse a local M3U file. The playlist is named after the file
    /// stem unless `name` is given.
    pub async fn load_file(&self, path: impl AsRef<Path>, name: Option<&str>) -> Result<Playlist> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read playlist file {}", path.display()))?;

        let name = match name {
            Some(name) => name.to_string(),
            None => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| DEFAULT_M3U_PLAYLIST_NAME.to_string()),
        };

        let content = String::from_utf8_lossy(&bytes);
        let playlist = m3u_parser::parse_with_name(&content, &name);
        tracing::info!(
            "Loaded {} channels from {}",
            playlist.len(),
            path.display()
        );

        Ok(playlist)
    }
}
