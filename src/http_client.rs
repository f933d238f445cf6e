//! Page fetching for manifest sniffing
//!
//! Features:
//! - [`PageFetcher`] seam so resolution can run against stubs
//! - Single GET per page, no retries, bounded by connect and total timeouts
//! - Brotli, Gzip, Deflate decoding (auto-negotiated)
//! - Best-effort probing: every failure collapses to "no manifest"

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::scan;

/// Fetches a page body as text.
///
/// Implementations may fail for any reason; callers that only sniff for
/// manifests go through [`probe_manifest`], which swallows the error.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> anyhow::Result<String>;
}

/// reqwest-backed [`PageFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default configuration
    pub fn new() -> crate::Result<Self> {
        Self::with_config(&Config::default())
    }

    /// Create a fetcher honoring the configured user agent and timeouts
    pub fn with_config(config: &Config) -> crate::Result<Self> {
        let client = Client::builder()
            // ═══════════════════════════════════════════════════════════════
            // IDENTIFICATION
            // ═══════════════════════════════════════════════════════════════
            .user_agent(config.user_agent.as_str())
            // ═══════════════════════════════════════════════════════════════
            // CONNECTION
            // ═══════════════════════════════════════════════════════════════
            .use_rustls_tls()
            .tcp_nodelay(true)
            // ═══════════════════════════════════════════════════════════════
            // COMPRESSION (auto-negotiated via Accept-Encoding)
            // ═══════════════════════════════════════════════════════════════
            .brotli(true)
            .gzip(true)
            .deflate(true)
            // ═══════════════════════════════════════════════════════════════
            // TIMEOUTS
            // ═══════════════════════════════════════════════════════════════
            // A stalled page must not hold up resolution.
            .connect_timeout(config.connect_timeout())
            .timeout(config.fetch_timeout())
            // ═══════════════════════════════════════════════════════════════
            // REDIRECTS
            // ═══════════════════════════════════════════════════════════════
            .redirect(reqwest::redirect::Policy::default())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch_text(&self, url: &str) -> anyhow::Result<String> {
        debug!("Fetching page");
        let response = self.client.get(url).send().await?.error_for_status()?;

        info!(
            status = %response.status(),
            version = ?response.version(),
            content_type = ?response.headers().get(reqwest::header::CONTENT_TYPE),
            "Response received"
        );

        Ok(response.text().await?)
    }
}

/// Fetch `url` and return the first manifest URL in its body.
///
/// Network errors, timeouts, error statuses and undecodable bodies all
/// yield `None`.
pub async fn probe_manifest(fetcher: &dyn PageFetcher, url: &str) -> Option<String> {
    match fetcher.fetch_text(url).await {
        Ok(body) => {
            let found = scan::find_first_manifest(&body).map(str::to_string);
            match &found {
                Some(manifest) => debug!(%url, %manifest, "Manifest found in page"),
                None => debug!(%url, bytes = body.len(), "No manifest in page"),
            }
            found
        }
        Err(e) => {
            warn!("Page fetch failed for {}: {:#}", url, e);
            None
        }
    }
}
