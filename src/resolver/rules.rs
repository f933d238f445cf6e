//! The default resolution rules.

use async_trait::async_trait;

use super::{Candidate, ResolveRule, RuleOutcome};
use crate::config::UnparsablePolicy;
use crate::http_client::{probe_manifest, PageFetcher};
use crate::scan::looks_like_manifest_url;
use crate::source::StreamSource;
use crate::youtube::{extract_video_id, is_youtube_host};

/// Input that is already a manifest URL plays directly, no network.
pub struct DirectManifestRule;

#[async_trait]
impl ResolveRule for DirectManifestRule {
    fn name(&self) -> &'static str {
        "direct_manifest"
    }

    fn matches(&self, candidate: &Candidate) -> bool {
        looks_like_manifest_url(&candidate.raw)
    }

    async fn apply(&self, candidate: &Candidate, _fetcher: &dyn PageFetcher) -> RuleOutcome {
        RuleOutcome::Resolved(StreamSource::hls(candidate.raw.clone()))
    }
}

/// Input that is not URL-shaped at all.
///
/// Defaults to handing the string to the native player untouched; the
/// renderer reports the failure if it cannot play it.
pub struct UnparsableRule {
    policy: UnparsablePolicy,
}

impl UnparsableRule {
    pub fn new(policy: UnparsablePolicy) -> Self {
        Self { policy }
    }
}

impl Default for UnparsableRule {
    fn default() -> Self {
        Self::new(UnparsablePolicy::default())
    }
}

#[async_trait]
impl ResolveRule for UnparsableRule {
    fn name(&self) -> &'static str {
        "unparsable"
    }

    fn matches(&self, candidate: &Candidate) -> bool {
        candidate.url.is_none()
    }

    async fn apply(&self, candidate: &Candidate, _fetcher: &dyn PageFetcher) -> RuleOutcome {
        let raw = candidate.raw.clone();
        RuleOutcome::Resolved(match self.policy {
            UnparsablePolicy::Hls => StreamSource::hls(raw),
            UnparsablePolicy::WebEmbed => StreamSource::web_embed(raw),
        })
    }
}

/// YouTube links with an extractable video id.
///
/// A YouTube page without an id (channel, bare `watch`) continues down the chain.
pub struct YouTubeRule;

#[async_trait]
impl ResolveRule for YouTubeRule {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn matches(&self, candidate: &Candidate) -> bool {
        is_youtube_host(&candidate.host)
    }

    async fn apply(&self, candidate: &Candidate, _fetcher: &dyn PageFetcher) -> RuleOutcome {
        match candidate.url.as_ref().and_then(extract_video_id) {
            Some(id) => RuleOutcome::Resolved(StreamSource::youtube(id)),
            None => RuleOutcome::Continue,
        }
    }
}

/// Known video platforms: sniff the page, embed it if nothing turns up.
pub struct HostingPlatformRule {
    domains: Vec<String>,
}

impl HostingPlatformRule {
    pub fn new(domains: Vec<String>) -> Self {
        let domains = domains
            .into_iter()
            .map(|d| d.trim().to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self { domains }
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }
}

#[async_trait]
impl ResolveRule for HostingPlatformRule {
    fn name(&self) -> &'static str {
        "platform"
    }

    fn matches(&self, candidate: &Candidate) -> bool {
        self.domains.iter().any(|d| candidate.host.contains(d.as_str()))
    }

    async fn apply(&self, candidate: &Candidate, fetcher: &dyn PageFetcher) -> RuleOutcome {
        RuleOutcome::Resolved(sniff_or_embed(candidate, fetcher).await)
    }
}

/// Any other URL: sniff the page, embed it if nothing turns up.
pub struct GenericPageRule;

#[async_trait]
impl ResolveRule for GenericPageRule {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn matches(&self, candidate: &Candidate) -> bool {
        candidate.url.is_some()
    }

    async fn apply(&self, candidate: &Candidate, fetcher: &dyn PageFetcher) -> RuleOutcome {
        RuleOutcome::Resolved(sniff_or_embed(candidate, fetcher).await)
    }
}

async fn sniff_or_embed(candidate: &Candidate, fetcher: &dyn PageFetcher) -> StreamSource {
    match probe_manifest(fetcher, &candidate.raw).await {
        Some(manifest) => StreamSource::hls(manifest),
        None => StreamSource::web_embed(candidate.raw.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Page {
        body: &'static str,
        calls: AtomicUsize,
    }

    impl Page {
        fn new(body: &'static str) -> Self {
            Self {
                body,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for Page {
        async fn fetch_text(&self, _url: &str) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.to_string())
        }
    }

    #[tokio::test]
    async fn direct_manifest_needs_no_fetch() {
        let page = Page::new("");
        let c = Candidate::new("https://cdn.example.com/live.M3U8");
        assert!(DirectManifestRule.matches(&c));
        assert_eq!(
            DirectManifestRule.apply(&c, &page).await,
            RuleOutcome::Resolved(StreamSource::hls("https://cdn.example.com/live.M3U8"))
        );
        assert_eq!(page.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unparsable_policy_selects_variant() {
        let page = Page::new("");
        let c = Candidate::new("not a url");
        assert!(UnparsableRule::default().matches(&c));
        assert_eq!(
            UnparsableRule::default().apply(&c, &page).await,
            RuleOutcome::Resolved(StreamSource::hls("not a url"))
        );
        assert_eq!(
            UnparsableRule::new(UnparsablePolicy::WebEmbed).apply(&c, &page).await,
            RuleOutcome::Resolved(StreamSource::web_embed("not a url"))
        );
    }

    #[tokio::test]
    async fn youtube_without_id_continues() {
        let page = Page::new("");
        let c = Candidate::new("https://www.youtube.com/watch?x=1");
        assert!(YouTubeRule.matches(&c));
        assert_eq!(YouTubeRule.apply(&c, &page).await, RuleOutcome::Continue);
    }

    #[test]
    fn platform_domains_are_normalized() {
        let rule = HostingPlatformRule::new(vec![" Hudl.COM ".into(), String::new()]);
        assert_eq!(rule.domains(), ["hudl.com".to_string()]);
        assert!(rule.matches(&Candidate::new("https://fan.hudl.com/team/1")));
        assert!(!rule.matches(&Candidate::new("https://example.com/")));
    }

    #[tokio::test]
    async fn platform_without_manifest_embeds_page() {
        let page = Page::new("<html>login required</html>");
        let rule = HostingPlatformRule::new(vec!["hudl.com".into()]);
        let c = Candidate::new("https://vcloud.hudl.com/broadcast/view/1");
        assert_eq!(
            rule.apply(&c, &page).await,
            RuleOutcome::Resolved(StreamSource::web_embed(
                "https://vcloud.hudl.com/broadcast/view/1"
            ))
        );
        assert_eq!(page.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn generic_page_with_manifest_plays_it() {
        let page = Page::new(r#"{"hls":"https://cdn.example.com/v/master.m3u8"}"#);
        let c = Candidate::new("https://example.com/watch/7");
        assert_eq!(
            GenericPageRule.apply(&c, &page).await,
            RuleOutcome::Resolved(StreamSource::hls("https://cdn.example.com/v/master.m3u8"))
        );
    }
}
