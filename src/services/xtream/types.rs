//! Xtream Codes API Types
//!
//! Type definitions for Xtream Codes Player API v2 live stream responses.
//! Providers disagree on whether ids are JSON numbers or strings, so the
//! numeric and id-like fields accept both.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

use crate::models::Channel;

/// Account credentials for one Xtream server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XtreamCredentials {
    /// Server base URL (e.g., "http://example.com:8080")
    pub server: String,
    /// Username for authentication
    pub username: String,
    /// Password for authentication
    pub password: String,
}

/// Server address or credentials that cannot be turned into request URLs
#[derive(Debug, thiserror::Error)]
pub enum InvalidServerUrl {
    #[error("invalid server URL: {0}")]
    Parse(#[from] url::ParseError),
    #[error("server URL cannot carry path segments: {0}")]
    CannotBeABase(String),
    /// `.` and `..` are resolved away by URL parsers, escaped or not, so they
    /// cannot appear as a path segment
    #[error("credentials cannot be used as URL path segments")]
    DotSegment,
}

impl XtreamCredentials {
    pub fn new(
        server: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Server URL with `segments` appended to its path. Each segment is
    /// percent-encoded on its own, so `/` or `#` inside a credential cannot
    /// change the URL structure. Dot segments are refused since they would
    /// be dropped.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, InvalidServerUrl> {
        if segments.iter().any(|segment| matches!(*segment, "." | "..")) {
            return Err(InvalidServerUrl::DotSegment);
        }
        let mut url = Url::parse(&self.server)?;
        url.path_segments_mut()
            .map_err(|_| InvalidServerUrl::CannotBeABase(self.server.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build the player_api.php URL for `action`
    pub fn api_url(&self, action: &str) -> Result<Url, InvalidServerUrl> {
        let mut url = self.endpoint(&["player_api.php"])?;
        url.query_pairs_mut()
            .append_pair("username", &self.username)
            .append_pair("password", &self.password)
            .append_pair("action", action);
        Ok(url)
    }

    /// Build playback URL for live streams
    pub fn live_url(&self, stream_id: i64) -> Result<Url, InvalidServerUrl> {
        let file = format!("{}.m3u8", stream_id);
        self.endpoint(&["live", &self.username, &self.password, &file])
    }
}

// ============================================================================
// Lenient field decoding
// ============================================================================

fn deserialize_lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Value = Deserialize::deserialize(deserializer)?;

    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| D::Error::custom(format!("Expected integer, got {}", n))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("Expected numeric string, got {:?}", s))),
        _ => Err(D::Error::custom("Expected integer or numeric string")),
    }
}

/// Optional number; anything that is not a readable integer counts as absent
fn deserialize_optional_lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = Deserialize::deserialize(deserializer)?;

    Ok(match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn deserialize_optional_number_as_string<'de, D>(
    deserializer: D,
) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Value = Deserialize::deserialize(deserializer)?;

    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(D::Error::custom("Expected string, number, or null")),
    }
}

// ============================================================================
// Live Stream Types
// ============================================================================

/// Live stream (channel) information from `get_live_streams`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct XtreamLiveStream {
    #[serde(
        default,
        deserialize_with = "deserialize_optional_lenient_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub num: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_type: Option<String>,
    #[serde(deserialize_with = "deserialize_lenient_i64")]
    pub stream_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_icon: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_number_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub epg_channel_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_number_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_id: Option<String>,
}

impl XtreamLiveStream {
    /// Map to a channel playable at `stream_url`
    pub fn into_channel(self, stream_url: Url) -> Channel {
        Channel {
            id: self.stream_id.to_string(),
            name: self.name,
            logo: self.stream_icon,
            group: self.category_id,
            url: stream_url.into(),
            epg_id: self.epg_channel_id,
        }
    }
}

impl TryFrom<&Channel> for XtreamLiveStream {
    type Error = std::num::ParseIntError;

    /// Only channels whose id is an Xtream stream id can be represented
    fn try_from(channel: &Channel) -> Result<Self, Self::Error> {
        Ok(Self {
            num: None,
            name: channel.name.clone(),
            stream_type: Some("live".to_string()),
            stream_id: channel.id.parse()?,
            stream_icon: channel.logo.clone(),
            epg_channel_id: channel.epg_id.clone(),
            category_id: channel.group.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(server: &str, username: &str, password: &str) -> XtreamCredentials {
        XtreamCredentials::new(server, username, password)
    }

    #[test]
    fn test_credentials_url_builders() {
        let creds = creds("http://example.com:8080", "user", "pass");

        assert_eq!(
            creds.api_url("get_live_streams").unwrap().as_str(),
            "http://example.com:8080/player_api.php?username=user&password=pass&action=get_live_streams"
        );
        assert_eq!(
            creds.live_url(123).unwrap().as_str(),
            "http://example.com:8080/live/user/pass/123.m3u8"
        );
    }

    #[test]
    fn test_url_builders_trailing_slash_and_base_path() {
        let creds1 = creds("http://example.com/", "u", "p");
        assert_eq!(creds1.live_url(1).unwrap().as_str(), "http://example.com/live/u/p/1.m3u8");

        let creds2 = creds("http://example.com/iptv/", "u", "p");
        assert_eq!(
            creds2.api_url("get_live_streams").unwrap().path(),
            "/iptv/player_api.php"
        );
    }

    #[test]
    fn test_url_builders_encode_credentials() {
        let creds = creds("http://svc", "a&b", "p/w#1");

        let api = creds.api_url("get_live_streams").unwrap();
        let pairs: Vec<(String, String)> = api.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("username".to_string(), "a&b".to_string()),
                ("password".to_string(), "p/w#1".to_string()),
                ("action".to_string(), "get_live_streams".to_string()),
            ]
        );

        let live = creds.live_url(7).unwrap();
        assert_eq!(live.as_str(), "http://svc/live/a&b/p%2Fw%231/7.m3u8");
        assert_eq!(live.path_segments().unwrap().count(), 4);
    }

    #[test]
    fn test_live_url_refuses_dot_credentials() {
        for (username, password) in [("u", ".."), (".", "p"), ("..", "p"), ("u", ".")] {
            assert!(
                matches!(
                    creds("http://svc", username, password).live_url(101),
                    Err(InvalidServerUrl::DotSegment)
                ),
                "{}/{}",
                username,
                password
            );
        }

        // Dots inside a longer segment are kept, an escaped dot stays literal
        let live = creds("http://svc", "...", "%2e%2e").live_url(101).unwrap();
        assert_eq!(live.as_str(), "http://svc/live/.../%252e%252e/101.m3u8");
        assert_eq!(live.path_segments().unwrap().count(), 4);

        // Query values are unaffected
        assert!(creds("http://svc", "u", "..").api_url("get_live_streams").is_ok());
    }

    #[test]
    fn test_invalid_server_url() {
        assert!(matches!(
            creds("not a url", "u", "p").live_url(1),
            Err(InvalidServerUrl::Parse(_))
        ));
        assert!(matches!(
            creds("mailto:someone@example.com", "u", "p").live_url(1),
            Err(InvalidServerUrl::CannotBeABase(_))
        ));
    }

    #[test]
    fn test_live_stream_minimal_record() {
        let stream: XtreamLiveStream =
            serde_json::from_str(r#"{"name":"CNN","stream_id":101,"category_id":"News"}"#).unwrap();

        assert_eq!(stream.stream_id, 101);
        assert_eq!(stream.category_id.as_deref(), Some("News"));
        assert_eq!(stream.num, None);
        assert_eq!(stream.stream_icon, None);
    }

    #[test]
    fn test_live_stream_lenient_fields() {
        let json = r#"{
            "num": "3",
            "name": "BBC",
            "stream_type": "live",
            "stream_id": "42",
            "stream_icon": "",
            "epg_channel_id": null,
            "category_id": 7,
            "tv_archive": 0,
            "added": "1700000000"
        }"#;
        let stream: XtreamLiveStream = serde_json::from_str(json).unwrap();

        assert_eq!(stream.num, Some(3));
        assert_eq!(stream.stream_id, 42);
        assert_eq!(stream.stream_icon.as_deref(), Some(""));
        assert_eq!(stream.epg_channel_id, None);
        assert_eq!(stream.category_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_live_stream_rejects_bad_stream_id() {
        assert!(serde_json::from_str::<XtreamLiveStream>(r#"{"name":"X","stream_id":"abc"}"#).is_err());
        assert!(serde_json::from_str::<XtreamLiveStream>(r#"{"name":"X"}"#).is_err());
    }

    #[test]
    fn test_into_channel() {
        let creds = creds("http://svc", "u", "p");
        let stream = XtreamLiveStream {
            num: Some(1),
            name: "CNN".to_string(),
            stream_type: None,
            stream_id: 101,
            stream_icon: None,
            epg_channel_id: Some("cnn.us".to_string()),
            category_id: Some("News".to_string()),
        };
        let channel = stream.into_channel(creds.live_url(101).unwrap());

        assert_eq!(
            channel,
            Channel {
                id: "101".to_string(),
                name: "CNN".to_string(),
                logo: None,
                group: Some("News".to_string()),
                url: "http://svc/live/u/p/101.m3u8".to_string(),
                epg_id: Some("cnn.us".to_string()),
            }
        );
    }

    #[test]
    fn test_channel_round_trip_through_wire_shape() {
        let creds = creds("http://svc", "u", "p");
        let channel = Channel {
            id: "9".to_string(),
            name: "Nine".to_string(),
            logo: Some("http://logo/9.png".to_string()),
            group: None,
            url: creds.live_url(9).unwrap().into(),
            epg_id: None,
        };

        let wire = XtreamLiveStream::try_from(&channel).unwrap();
        let json = serde_json::to_string(&wire).unwrap();
        assert!(!json.contains("category_id"));

        let back: XtreamLiveStream = serde_json::from_str(&json).unwrap();
        let restored = back.into_channel(creds.live_url(9).unwrap());
        assert_eq!(restored, channel);
    }

    #[test]
    fn test_channel_with_text_id_has_no_wire_shape() {
        let channel = Channel {
            id: "ch1".to_string(),
            name: "News".to_string(),
            logo: None,
            group: None,
            url: "http://x".to_string(),
            epg_id: None,
        };
        assert!(XtreamLiveStream::try_from(&channel).is_err());
    }
}
