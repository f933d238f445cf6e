//! Resolver configuration loaded from `~/.config/filmviewer/config.toml`.
//!
//! Every field has a default, so a missing file (or a partial one) is fine:
//!
//! ```toml
//! user_agent = "FilmViewer/1.0"
//! fetch_timeout_secs = 8
//! connect_timeout_secs = 4
//! platform_domains = ["vcloud.hudl.com", "fan.hudl.com", "hudl.com"]
//! unparsable = "hls"        # or "web_embed"
//! cache_ttl_secs = 0        # 0 disables the resolution cache
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_USER_AGENT: &str = "FilmViewer/1.0";

/// Video platforms whose pages need a web view when no manifest is found.
pub const DEFAULT_PLATFORM_DOMAINS: &[&str] = &["vcloud.hudl.com", "fan.hudl.com", "hudl.com"];

/// Where input that does not parse as a URL goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnparsablePolicy {
    /// Hand the raw string to the native player verbatim.
    #[default]
    Hls,
    /// Load the raw string in a web view.
    WebEmbed,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `User-Agent` sent when sniffing pages.
    pub user_agent: String,
    /// Upper bound on a whole page fetch, body included.
    pub fetch_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Host substrings treated as known video platforms.
    pub platform_domains: Vec<String>,
    pub unparsable: UnparsablePolicy,
    /// Lifetime of cached resolutions; `0` turns the cache off.
    pub cache_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout_secs: 8,
            connect_timeout_secs: 4,
            platform_domains: DEFAULT_PLATFORM_DOMAINS
                .iter()
                .map(|d| (*d).to_string())
                .collect(),
            unparsable: UnparsablePolicy::default(),
            cache_ttl_secs: 0,
        }
    }
}

impl Config {
    /// Load from the default location. Returns defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load from an explicit path. Returns defaults if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// `None` when caching is disabled.
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }
}

/// Return the path to the config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("filmviewer")
        .join("config.toml")
}
