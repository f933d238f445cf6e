//! YouTube link recognition and video id extraction.
//!
//! Pure functions, no network access. Handles the link shapes people
//! actually paste:
//!
//! - `https://youtu.be/<id>`
//! - `https://www.youtube.com/watch?v=<id>`
//! - `https://www.youtube.com/live/<id>`
//! - `https://www.youtube.com/embed/<id>`

use url::Url;

const SHORT_HOST: &str = "youtu.be";
const MAIN_HOST: &str = "youtube.com";

/// Path segments that are followed by the video id.
const ID_PREFIX_SEGMENTS: &[&str] = &["live", "embed"];

/// Returns `true` if a lower-cased host belongs to YouTube.
pub fn is_youtube_host(host: &str) -> bool {
    host.contains(MAIN_HOST) || host.contains(SHORT_HOST)
}

/// Extract the video id from a YouTube URL.
///
/// Returns `None` for non-YouTube hosts and for YouTube pages that carry no
/// id (channel pages, `watch` without `v`). Blank ids are never returned.
pub fn extract_video_id(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();

    let id = if host.contains(SHORT_HOST) {
        last_path_segment(url)
    } else if host.contains(MAIN_HOST) {
        query_param(url, "v").or_else(|| id_after_prefix_segment(url))
    } else {
        None
    };

    id.filter(|id| !id.trim().is_empty())
}

fn path_segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

fn last_path_segment(url: &Url) -> Option<String> {
    path_segments(url).last().map(|s| (*s).to_string())
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// `/live/<id>` and `/embed/<id>`: the segment right after the first marker.
fn id_after_prefix_segment(url: &Url) -> Option<String> {
    let segments = path_segments(url);
    let marker = segments.iter().position(|segment| {
        ID_PREFIX_SEGMENTS
            .iter()
            .any(|prefix| segment.eq_ignore_ascii_case(prefix))
    })?;
    segments.get(marker + 1).map(|s| (*s).to_string())
}
