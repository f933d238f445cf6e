//! Web-view payloads and quad audio policy.
//!
//! [`StreamSource::YouTube`](crate::StreamSource::YouTube) renders through
//! the YouTube iframe API inside a web view; this module builds that
//! document. The renderer loads it with [`YOUTUBE_BASE_URL`] as base URL so
//! the API accepts the origin.
//!
//! In the quad view exactly one tile is audible. Web tiles get a
//! `start_muted` hint baked into the document; native tiles get a volume.

use std::fmt::Write;

use crate::applink::TILE_COUNT;

pub const YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

/// Index of the audible tile (top-right).
pub const AUDIBLE_TILE: usize = 1;

/// Whether a web tile should start muted.
pub fn start_muted(tile: usize) -> bool {
    tile != AUDIBLE_TILE
}

/// Native player volume for a tile.
pub fn tile_volume(tile: usize) -> f32 {
    if tile == AUDIBLE_TILE {
        1.0
    } else {
        0.0
    }
}

/// Per-tile mute hints for the whole grid.
pub fn mute_plan() -> [bool; TILE_COUNT] {
    std::array::from_fn(start_muted)
}

/// Build the iframe-API document that autoplays `video_id`.
///
/// The id is escaped for a single-quoted JavaScript string; ids come from
/// user links and are otherwise untrusted.
pub fn youtube_embed_html(video_id: &str, start_muted: bool) -> String {
    let on_ready = if start_muted {
        "e.target.mute();"
    } else {
        "e.target.unMute();"
    };

    let mut html = String::with_capacity(1024);
    html.push_str("<html>\n");
    html.push_str("<body style=\"margin:0;background:black;overflow:hidden;\">\n");
    html.push_str("  <div id=\"player\"></div>\n");
    html.push_str("  <script src=\"https://www.youtube.com/iframe_api\"></script>\n");
    html.push_str("  <script>\n");
    html.push_str("    var player;\n");
    html.push_str("    function onYouTubeIframeAPIReady() {\n");
    html.push_str("      player = new YT.Player('player', {\n");
    let _ = writeln!(html, "        videoId: '{}',", escape_js(video_id));
    html.push_str("        playerVars: { 'autoplay': 1, 'controls': 1, 'playsinline': 1 },\n");
    html.push_str("        events: { 'onReady': onPlayerReady }\n");
    html.push_str("      });\n");
    html.push_str("    }\n");
    html.push_str("    function onPlayerReady(e) {\n");
    let _ = writeln!(html, "      {on_ready}");
    html.push_str("      e.target.playVideo();\n");
    html.push_str("    }\n");
    html.push_str("    function mute(){ if(player) player.mute(); }\n");
    html.push_str("    function unmute(){ if(player) player.unMute(); }\n");
    html.push_str("  </script>\n");
    html.push_str("</body>\n");
    html.push_str("</html>\n");
    html
}

fn escape_js(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '<' => out.push_str("\\x3c"),
            '>' => out.push_str("\\x3e"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}
