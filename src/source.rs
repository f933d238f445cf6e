//! Playable source classification.
//!
//! A [`StreamSource`] is the single result of resolving a raw link. The
//! rendering layer matches on it exhaustively and picks one of three paths:
//! native adaptive playback, an embedded YouTube player, or a plain web view.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// What a raw input string resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamSource {
    /// Direct HLS manifest, playable by a native player.
    Hls {
        url: String,
        /// Extra request headers the player must send (auth, user agent).
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        headers: HashMap<String, String>,
    },
    /// Known YouTube video, rendered through the iframe embed API.
    #[serde(rename = "youtube")]
    YouTube { video_id: String },
    /// Anything else, loaded as-is in a web view.
    WebEmbed { url: String },
}

/// Discriminant of a [`StreamSource`], for logging and CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Hls,
    YouTube,
    WebEmbed,
}

impl StreamSource {
    /// HLS source with no extra headers.
    pub fn hls(url: impl Into<String>) -> Self {
        Self::Hls {
            url: url.into(),
            headers: HashMap::new(),
        }
    }

    pub fn youtube(video_id: impl Into<String>) -> Self {
        Self::YouTube {
            video_id: video_id.into(),
        }
    }

    pub fn web_embed(url: impl Into<String>) -> Self {
        Self::WebEmbed { url: url.into() }
    }

    /// Attach a request header to an HLS source. Other variants are returned unchanged.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Hls { headers, .. } = &mut self {
            headers.insert(name.into(), value.into());
        }
        self
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Hls { .. } => SourceKind::Hls,
            Self::YouTube { .. } => SourceKind::YouTube,
            Self::WebEmbed { .. } => SourceKind::WebEmbed,
        }
    }

    /// The URL or video id the renderer loads.
    pub fn target(&self) -> &str {
        match self {
            Self::Hls { url, .. } | Self::WebEmbed { url } => url,
            Self::YouTube { video_id } => video_id,
        }
    }

    /// Whether this source plays through a web view rather than the native player.
    pub fn is_web(&self) -> bool {
        !matches!(self, Self::Hls { .. })
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hls => "hls",
            Self::YouTube => "youtube",
            Self::WebEmbed => "web_embed",
        })
    }
}

impl fmt::Display for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.target())
    }
}
