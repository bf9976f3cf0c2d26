//! Playlist to M3U text
//!
//! Output is readable by [`crate::services::m3u_parser`]: every channel is
//! written as one `#EXTINF:-1` line followed by its URL. Channels the parser
//! could not read back (blank name, blank URL or a URL starting with `#`) are
//! left out.

use std::fmt::Write;

use crate::models::{Channel, Playlist};

/// Make a value safe to place on an `#EXTINF` line. Double quotes would
/// otherwise open attributes the parser picks up anywhere on the line.
fn sanitize_attr(value: &str) -> String {
    value.replace('"', "'").replace(['\r', '\n'], " ")
}

fn sanitize_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// Whether the parser would turn this channel's two lines back into a channel
fn is_exportable(channel: &Channel) -> bool {
    let url = channel.url.trim();
    !url.is_empty() && !url.starts_with('#') && !channel.name.trim().is_empty()
}

fn write_channel(out: &mut String, channel: &Channel) {
    out.push_str("#EXTINF:-1");
    let attrs = [
        ("tvg-id", channel.epg_id.as_deref()),
        ("tvg-logo", channel.logo.as_deref()),
        ("group-title", channel.group.as_deref()),
    ];
    for (key, value) in attrs {
        if let Some(value) = value {
            let _ = write!(out, " {}=\"{}\"", key, sanitize_attr(value));
        }
    }
    let _ = writeln!(out, ",{}", sanitize_attr(&channel.name));
    let _ = writeln!(out, "{}", sanitize_line(channel.url.trim()));
}

/// Render a playlist as M3U text
pub fn to_m3u(playlist: &Playlist) -> String {
    let mut out = String::with_capacity(16 + playlist.len() * 128);
    out.push_str("#EXTM3U\n");
    let mut skipped = 0usize;
    for channel in &playlist.channels {
        if is_exportable(channel) {
            write_channel(&mut out, channel);
        } else {
            skipped += 1;
        }
    }
    if skipped > 0 {
        tracing::warn!(
            "Skipped {} of {} channels without a usable name or URL",
            skipped,
            playlist.len()
        );
    }
    out
}
