//! Manifest URL detection in free text.
//!
//! Pages that wrap a player usually carry the manifest URL somewhere in
//! their markup or inline script. The scan is deliberately liberal: any
//! absolute `http(s)` URL containing `.m3u8`, cut at whitespace, quotes,
//! angle brackets or parentheses.

use std::sync::LazyLock;

use regex::Regex;

static MANIFEST_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https?://[^\s'"<>()]+\.m3u8[^\s'"<>()]*"#)
        .expect("manifest pattern is valid")
});

const MANIFEST_EXT: &str = ".m3u8";

/// Returns the first manifest URL found in `text`, if any.
pub fn find_first_manifest(text: &str) -> Option<&str> {
    MANIFEST_URL.find(text).map(|m| m.as_str())
}

/// True when `s` is already a direct manifest link: an `http`-prefixed
/// string containing `.m3u8` in any case.
pub fn looks_like_manifest_url(s: &str) -> bool {
    starts_with_http(s) && s.to_ascii_lowercase().contains(MANIFEST_EXT)
}

fn starts_with_http(s: &str) -> bool {
    s.get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("http"))
}
