//! Deep-link and pasted-entry parsing.
//!
//! Turns what the user pastes (or what an app link carries) into inputs for
//! the resolver:
//!
//! - Quad links: `filmviewer://quad?u1=..&u2=..` or `https://<host>/quad?u1=..`
//! - Queue links: `?q=<base64>` where the payload is newline-delimited URLs
//! - A bare base64 payload or a single direct URL
//!
//! This module never touches the network.

use base64::alphabet;
use base64::engine::general_purpose::GeneralPurpose;
use base64::engine::{DecodePaddingMode, GeneralPurposeConfig};
use base64::Engine;
use url::Url;

use crate::error::{Error, Result};

pub const APP_SCHEME: &str = "filmviewer";
pub const QUAD_HOST: &str = "quad";
pub const QUAD_PATH_PREFIX: &str = "/quad";
pub const QUEUE_PARAM: &str = "q";

/// Number of tiles in the quad view.
pub const TILE_COUNT: usize = 4;

/// Query parameter names for the tiles, in tile order.
pub const TILE_PARAMS: [&str; TILE_COUNT] = ["u1", "u2", "u3", "u4"];

const QUEUE_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The four tile inputs of a quad link, top-left to bottom-right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadLink {
    pub inputs: [Option<String>; TILE_COUNT],
}

impl QuadLink {
    /// Parse a quad link.
    ///
    /// # Errors
    ///
    /// [`Error::NotQuad`] if the link has neither the quad scheme/host nor a
    /// `/quad` path, or carries none of `u1..u4`.
    pub fn parse(link: &str) -> Result<Self> {
        let url = Url::parse(link.trim()).map_err(|_| Error::NotQuad(link.to_string()))?;
        if !is_quad_url(&url) {
            return Err(Error::NotQuad(link.to_string()));
        }
        Ok(Self {
            inputs: tile_inputs(&url),
        })
    }

    /// Tile inputs as an owned list, for [`Resolver::resolve_all`](crate::Resolver::resolve_all).
    pub fn to_vec(&self) -> Vec<Option<String>> {
        self.inputs.to_vec()
    }

    /// Number of tiles that have an input.
    pub fn filled(&self) -> usize {
        self.inputs
            .iter()
            .filter(|input| input.as_deref().is_some_and(|s| !s.trim().is_empty()))
            .count()
    }
}

/// What a pasted entry or app link asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    Quad(QuadLink),
    /// Play these inputs one after another.
    Queue(Vec<String>),
}

/// Classify text from the link entry box or an incoming app link.
///
/// Quad links win; then a `q` payload; then the text itself as a payload
/// or a single URL.
pub fn parse_entry(raw: &str) -> Result<LinkTarget> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::EmptyQueue);
    }

    if let Ok(url) = Url::parse(raw) {
        if is_quad_url(&url) {
            return Ok(LinkTarget::Quad(QuadLink {
                inputs: tile_inputs(&url),
            }));
        }
    }

    queue_from_link(raw).map(LinkTarget::Queue)
}

/// Queue entries from a link carrying `?q=<base64>`, or from the raw text.
pub fn queue_from_link(raw: &str) -> Result<Vec<String>> {
    let raw = raw.trim();
    let payload = Url::parse(raw).ok().and_then(|url| {
        url.query_pairs()
            .find(|(key, _)| key == QUEUE_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.trim().is_empty())
    });

    match payload {
        Some(payload) => decode_queue(&payload),
        None => decode_queue(raw),
    }
}

/// Decode a base64 newline-delimited list of links.
///
/// When the payload does not decode to anything link-like, a payload that
/// is itself an `http(s)` URL becomes a one-entry queue.
///
/// # Errors
///
/// [`Error::EmptyQueue`] when neither reading yields a link.
pub fn decode_queue(payload: &str) -> Result<Vec<String>> {
    let payload = payload.trim();
    let decoded = decode_base64_text(payload).unwrap_or_default();

    if !decoded.trim().is_empty() && contains_http_link(&decoded) {
        let links: Vec<String> = decoded
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        tracing::debug!("Decoded queue with {} entries", links.len());
        return Ok(links);
    }

    if payload.starts_with("http://") || payload.starts_with("https://") {
        return Ok(vec![payload.to_string()]);
    }

    Err(Error::EmptyQueue)
}

/// Encode links as a queue payload, the inverse of [`decode_queue`].
pub fn encode_queue<S: AsRef<str>>(links: &[S]) -> String {
    let joined = links
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n");
    QUEUE_ENGINE.encode(joined)
}

fn is_quad_url(url: &Url) -> bool {
    let scheme_host_quad = url.scheme() == APP_SCHEME && url.host_str() == Some(QUAD_HOST);
    let path_quad = url.path().starts_with(QUAD_PATH_PREFIX);
    let has_any_tile = url
        .query_pairs()
        .any(|(key, _)| TILE_PARAMS.contains(&key.as_ref()));
    (scheme_host_quad || path_quad) && has_any_tile
}

fn tile_inputs(url: &Url) -> [Option<String>; TILE_COUNT] {
    TILE_PARAMS.map(|name| {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    })
}

fn contains_http_link(text: &str) -> bool {
    text.contains("http://") || text.contains("https://")
}

/// Lenient base64: line breaks ignored, padding optional, `+` restored from
/// form-decoded spaces, URL-safe characters accepted.
fn decode_base64_text(payload: &str) -> Option<String> {
    let normalized: String = payload
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\t'))
        .map(|c| match c {
            ' ' | '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    let bytes = QUEUE_ENGINE.decode(normalized).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}
