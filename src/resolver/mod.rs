//! Stream source resolution.
//!
//! Turns a raw pasted or deep-linked string into exactly one
//! [`StreamSource`]. Resolution never fails: every dead end falls through to
//! a more permissive classification, ending at [`StreamSource::WebEmbed`].
//!
//! # Architecture
//!
//! - [`ResolveRule`]: one step of the decision chain
//! - [`Resolver`]: evaluates rules in order, first definitive answer wins
//! - [`CachedResolver`]: optional time-bounded memo on top of a resolver
//!
//! Default chain:
//!
//! | # | Rule | Network |
//! |---|------|---------|
//! | 1 | [`DirectManifestRule`] | no |
//! | 2 | [`UnparsableRule`] | no |
//! | 3 | [`YouTubeRule`] | no |
//! | 4 | [`HostingPlatformRule`] | one GET |
//! | 5 | [`GenericPageRule`] | one GET |
//!
//! # Example
//!
//! ```rust,no_run
//! use filmviewer::{Config, Resolver, StreamSource};
//!
//! # async fn example() -> filmviewer::Result<()> {
//! let resolver = Resolver::http(&Config::default())?;
//!
//! match resolver.resolve("https://youtu.be/abc123").await {
//!     StreamSource::YouTube { video_id } => println!("youtube {video_id}"),
//!     other => println!("{other}"),
//! }
//! # Ok(())
//! # }
//! ```

mod cache;
pub mod rules;

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use futures::stream::{FuturesUnordered, Stream};
use tracing::{debug, info, instrument};
use url::Url;

pub use cache::CachedResolver;
pub use rules::{
    DirectManifestRule, GenericPageRule, HostingPlatformRule, UnparsableRule, YouTubeRule,
};

use crate::config::Config;
use crate::http_client::{HttpFetcher, PageFetcher};
use crate::source::StreamSource;

/// A trimmed input together with its parsed form.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Input with surrounding whitespace removed.
    pub raw: String,
    /// `None` when the input is not URL-shaped.
    pub url: Option<Url>,
    /// Lower-cased host, empty when there is none.
    pub host: String,
}

impl Candidate {
    pub fn new(input: &str) -> Self {
        let raw = input.trim().to_string();
        let url = Url::parse(&raw).ok();
        let host = url
            .as_ref()
            .and_then(Url::host_str)
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self { raw, url, host }
    }
}

/// Result of applying one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// Final answer, stop evaluating.
    Resolved(StreamSource),
    /// Not decided here, try the next rule.
    Continue,
}

/// One step in the resolution chain.
#[async_trait]
pub trait ResolveRule: Send + Sync {
    /// Rule name for logs (e.g., "youtube", "generic").
    fn name(&self) -> &'static str;

    /// Whether this rule applies to the candidate at all.
    fn matches(&self, candidate: &Candidate) -> bool;

    /// Classify the candidate. Rules that sniff pages use `fetcher`.
    async fn apply(&self, candidate: &Candidate, fetcher: &dyn PageFetcher) -> RuleOutcome;
}

/// Resolves raw strings into [`StreamSource`]s.
///
/// Stateless between calls: concurrent resolutions share nothing but the
/// fetcher. Dropping a pending `resolve` future drops its in-flight request.
pub struct Resolver {
    rules: Vec<Box<dyn ResolveRule>>,
    fetcher: Arc<dyn PageFetcher>,
}

impl Resolver {
    /// Create a resolver with the default rule chain.
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::with_config(fetcher, &Config::default())
    }

    /// Create a resolver with the default rule chain tuned by `config`.
    pub fn with_config(fetcher: Arc<dyn PageFetcher>, config: &Config) -> Self {
        let rules: Vec<Box<dyn ResolveRule>> = vec![
            Box::new(DirectManifestRule),
            Box::new(UnparsableRule::new(config.unparsable)),
            Box::new(YouTubeRule),
            Box::new(HostingPlatformRule::new(config.platform_domains.clone())),
            Box::new(GenericPageRule),
        ];
        Self::from_rules(fetcher, rules)
    }

    /// Create a resolver with a custom rule chain, evaluated in order.
    pub fn from_rules(fetcher: Arc<dyn PageFetcher>, rules: Vec<Box<dyn ResolveRule>>) -> Self {
        Self { rules, fetcher }
    }

    /// Resolver backed by a real HTTP fetcher.
    pub fn http(config: &Config) -> crate::Result<Self> {
        let fetcher = HttpFetcher::with_config(config)?;
        Ok(Self::with_config(Arc::new(fetcher), config))
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Resolve one input. Always returns exactly one source.
    #[instrument(skip(self, raw), fields(input = %raw.trim()))]
    pub async fn resolve(&self, raw: &str) -> StreamSource {
        let candidate = Candidate::new(raw);

        for rule in &self.rules {
            if !rule.matches(&candidate) {
                continue;
            }
            debug!("Matched rule: {}", rule.name());
            match rule.apply(&candidate, self.fetcher.as_ref()).await {
                RuleOutcome::Resolved(source) => {
                    info!(rule = rule.name(), kind = %source.kind(), "Resolved");
                    return source;
                }
                RuleOutcome::Continue => debug!("Rule {} passed", rule.name()),
            }
        }

        debug!("No rule resolved input, embedding as page");
        StreamSource::web_embed(candidate.raw)
    }

    /// Resolve several inputs concurrently, preserving order.
    ///
    /// Missing or blank inputs stay `None`. One slow or failing page does
    /// not affect the others.
    pub async fn resolve_all(&self, inputs: &[Option<String>]) -> Vec<Option<StreamSource>> {
        join_all(inputs.iter().map(move |input| async move {
            match non_blank(input.as_deref()) {
                Some(raw) => Some(self.resolve(raw).await),
                None => None,
            }
        }))
        .await
    }

    /// Resolve several inputs concurrently, yielding `(index, source)` as
    /// each one finishes. Blank inputs are skipped.
    pub fn resolve_unordered(
        &self,
        inputs: Vec<Option<String>>,
    ) -> impl Stream<Item = (usize, StreamSource)> + Unpin + '_ {
        inputs
            .into_iter()
            .enumerate()
            .filter_map(|(index, input)| {
                non_blank(input.as_deref()).map(|raw| (index, raw.to_string()))
            })
            .map(move |(index, raw)| async move { (index, self.resolve(&raw).await) })
            .collect::<FuturesUnordered<_>>()
    }
}

fn non_blank(input: Option<&str>) -> Option<&str> {
    input.filter(|s| !s.trim().is_empty())
}
