//! Xtream Codes URL Detection
//!
//! Recognises M3U download links served by an Xtream Codes panel so their
//! channels can be read from the Player API instead.

use super::types::XtreamCredentials;
use tracing::debug;
use url::Url;

/// Value of the first non-empty `key` query parameter
fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, v)| k == key && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}

/// Extract Xtream credentials from a panel's `get.php` M3U link
///
/// The server is everything before `get.php`, so panels installed under a
/// sub-path (`http://host/panel/get.php`) keep that prefix for
/// `player_api.php` and the stream URLs. Returns `None` for any other URL or
/// when `username` or `password` is missing or empty.
pub fn extract_credentials(m3u_url: &str) -> Option<XtreamCredentials> {
    let mut url = Url::parse(m3u_url)
        .map_err(|e| debug!("Not an Xtream URL, parse failed: {}", e))
        .ok()?;

    let is_get_php = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .is_some_and(|last| last.eq_ignore_ascii_case("get.php"));
    if !is_get_php {
        return None;
    }

    let (Some(username), Some(password)) =
        (query_value(&url, "username"), query_value(&url, "password"))
    else {
        debug!("get.php URL without username and password");
        return None;
    };

    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut().ok()?.pop();
    let server = url.as_str().trim_end_matches('/').to_string();

    debug!("Xtream panel detected: server={}, username={}", server, username);

    Some(XtreamCredentials::new(server, username, password))
}
