use serde::{Deserialize, Serialize};

/// Name given to playlists parsed from M3U text when the caller has none
pub const DEFAULT_M3U_PLAYLIST_NAME: &str = "M3U Playlist";

/// Name given to playlists built from the Xtream live stream list
pub const XTREAM_PLAYLIST_NAME: &str = "XStream Playlist";

/// Single playable stream
///
/// Field values are passed through as the source supplied them. `id` is not
/// required to be unique within a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub url: String,
    /// EPG identifier, independent of `id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epg_id: Option<String>,
}

/// Ordered list of channels with a display name
///
/// Channels keep the order in which their source listed them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub name: String,
    #[serde(default)]
    pub channels: Vec<Channel>,
}

impl Playlist {
    pub fn new(name: impl Into<String>, channels: Vec<Channel>) -> Self {
        Self {
            name: name.into(),
            channels,
        }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Distinct group labels in first-seen order
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for group in self.channels.iter().filter_map(|c| c.group.as_deref()) {
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
        groups
    }

    /// Channels labelled with `group`, in playlist order
    pub fn channels_in_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Channel> + 'a {
        self.channels
            .iter()
            .filter(move |c| c.group.as_deref() == Some(group))
    }

    /// First channel carrying `id`
    pub fn find(&self, id: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == id)
    }
}

/// Request to parse raw M3U text
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    pub content: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Request to load a playlist from a remote URL
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadRequest {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Request to fetch the live streams of an Xtream account
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XtreamLiveRequest {
    pub server: String,
    pub username: String,
    pub password: String,
}
