//! M3U playlist parser
//!
//! Accepts the common `#EXTM3U` / `#EXTINF` dialect and never fails: lines
//! it cannot interpret are skipped.
//!
//! ```text
//! #EXTM3U
//! #EXTINF:-1 tvg-id="ch1" tvg-name="News" tvg-logo="http://logo/ch1.png" group-title="News",News Channel
//! http://example.com/news.m3u8
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use crate::models::{Channel, Playlist, DEFAULT_M3U_PLAYLIST_NAME};

const EXTINF_PREFIX: &str = "#EXTINF:";

lazy_static! {
    /// Regex to parse EXTINF attributes (tvg-id="...", group-title="...", etc)
    static ref ATTR_REGEX: Regex = Regex::new(r#"(\w+(?:-\w+)*)="([^"]*)""#).unwrap();
}

/// Parsed EXTINF line data
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtinfData {
    /// `key="value"` pairs; a repeated key keeps its last value
    pub attributes: HashMap<String, String>,
    /// Text after the last comma, trimmed
    pub title: Option<String>,
}

impl ExtinfData {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Title after the comma, falling back to `tvg-name`
    pub fn display_name(&self) -> Option<&str> {
        self.title
            .as_deref()
            .or_else(|| self.attribute("tvg-name"))
    }

    /// Build the channel this info line describes once its URL line is seen.
    /// `position` is the number of channels already emitted.
    fn into_channel(self, url: &str, position: usize) -> Option<Channel> {
        let name = self.display_name()?.to_string();
        let mut attributes = self.attributes;
        let epg_id = attributes.remove("tvg-id");

        Some(Channel {
            id: epg_id.clone().unwrap_or_else(|| position.to_string()),
            name,
            logo: attributes.remove("tvg-logo"),
            group: attributes.remove("group-title"),
            url: url.to_string(),
            epg_id,
        })
    }
}

/// Parse an EXTINF line
/// Format: #EXTINF:duration tvg-id="..." tvg-name="..." tvg-logo="..." group-title="...",Title
///
/// Attributes are scanned over the whole line and the title is whatever
/// follows the last comma, so a line without a comma has no title.
pub fn parse_extinf(line: &str) -> ExtinfData {
    let attributes = ATTR_REGEX
        .captures_iter(line)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect();

    let title = line
        .rfind(',')
        .map(|comma| line[comma + 1..].trim().to_string());

    ExtinfData { attributes, title }
}

/// Kind of a trimmed playlist line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind<'a> {
    Info(&'a str),
    Url(&'a str),
    Ignored,
}

fn classify(line: &str) -> LineKind<'_> {
    if line.starts_with(EXTINF_PREFIX) {
        LineKind::Info(line)
    } else if !line.is_empty() && !line.starts_with('#') {
        LineKind::Url(line)
    } else {
        LineKind::Ignored
    }
}

/// Parser state between lines
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum ParseState {
    #[default]
    AwaitingInfo,
    /// An info line was read and its URL line has not arrived yet
    PendingInfo(ExtinfData),
}

impl ParseState {
    /// Advance over one line. Returns the next state and the channel that
    /// the line completed, if any. `emitted` is the number of channels
    /// accepted so far.
    pub fn step(self, line: &str, emitted: usize) -> (ParseState, Option<Channel>) {
        match classify(line.trim()) {
            // A newer info line replaces any pending one
            LineKind::Info(info) => (ParseState::PendingInfo(parse_extinf(info)), None),
            LineKind::Url(url) => {
                let channel = match self {
                    ParseState::PendingInfo(info) => info.into_channel(url, emitted),
                    ParseState::AwaitingInfo => None,
                };
                (ParseState::AwaitingInfo, channel)
            }
            LineKind::Ignored => (self, None),
        }
    }
}

/// Parse M3U text into a playlist named [`DEFAULT_M3U_PLAYLIST_NAME`]
pub fn parse(content: &str) -> Playlist {
    parse_with_name(content, DEFAULT_M3U_PLAYLIST_NAME)
}

/// Parse M3U text into a playlist with the given name
pub fn parse_with_name(content: &str, playlist_name: &str) -> Playlist {
    let (_, channels) = content.split(|c: char| c == '\n' || c == '\r').fold(
        (ParseState::default(), Vec::new()),
        |(state, mut channels), line| {
            let (next, channel) = state.step(line, channels.len());
            channels.extend(channel);
            (next, channels)
        },
    );

    tracing::debug!(
        playlist = playlist_name,
        channels = channels.len(),
        "Parsed M3U playlist"
    );

    Playlist::new(playlist_name, channels)
}
