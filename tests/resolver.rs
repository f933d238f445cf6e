//! Resolution behavior against stub fetchers.
//!
//! No test here touches the network: every fetcher is an in-process stub
//! that counts calls, returns canned bodies, fails, or sleeps.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;

use filmviewer::{Config, PageFetcher, Resolver, StreamSource, UnparsablePolicy};

// ─── Stubs ───────────────────────────────────────────────────────────────────

/// Fails the test if anything is fetched.
#[derive(Default)]
struct ForbidNetwork {
    calls: AtomicUsize,
}

#[async_trait]
impl PageFetcher for ForbidNetwork {
    async fn fetch_text(&self, url: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("unexpected fetch of {url}")
    }
}

/// Serves one canned body for every URL and records what was requested.
struct CannedPage {
    body: String,
    requested: Mutex<Vec<String>>,
}

impl CannedPage {
    fn new(body: &str) -> Self {
        Self {
            body: body.to_string(),
            requested: Mutex::new(Vec::new()),
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for CannedPage {
    async fn fetch_text(&self, url: &str) -> anyhow::Result<String> {
        self.requested.lock().unwrap().push(url.to_string());
        Ok(self.body.clone())
    }
}

/// Always errors, like a DNS failure or a 500.
struct Broken;

#[async_trait]
impl PageFetcher for Broken {
    async fn fetch_text(&self, _url: &str) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("HTTP status server error (500 Internal Server Error)"))
    }
}

/// Per-URL bodies and delays.
#[derive(Default)]
struct Delayed {
    pages: HashMap<String, (Duration, Option<String>)>,
}

impl Delayed {
    fn page(mut self, url: &str, delay_ms: u64, body: Option<&str>) -> Self {
        self.pages.insert(
            url.to_string(),
            (Duration::from_millis(delay_ms), body.map(str::to_string)),
        );
        self
    }
}

#[async_trait]
impl PageFetcher for Delayed {
    async fn fetch_text(&self, url: &str) -> anyhow::Result<String> {
        let (delay, body) = self
            .pages
            .get(url)
            .cloned()
            .unwrap_or((Duration::ZERO, None));
        tokio::time::sleep(delay).await;
        body.ok_or_else(|| anyhow::anyhow!("timed out fetching {url}"))
    }
}

/// Never answers; records when the in-flight request is dropped.
#[derive(Default)]
struct Hanging {
    started: AtomicUsize,
    dropped: Arc<AtomicUsize>,
}

struct DropFlag(Arc<AtomicUsize>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PageFetcher for Hanging {
    async fn fetch_text(&self, _url: &str) -> anyhow::Result<String> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let _in_flight = DropFlag(Arc::clone(&self.dropped));
        std::future::pending::<anyhow::Result<String>>().await
    }
}

fn resolver_with(fetcher: Arc<dyn PageFetcher>) -> Resolver {
    Resolver::new(fetcher)
}

// ─── Direct manifests ────────────────────────────────────────────────────────

#[tokio::test]
async fn direct_manifests_never_fetch() {
    let fetcher = Arc::new(ForbidNetwork::default());
    let resolver = resolver_with(fetcher.clone());

    for input in [
        "https://cdn.example.com/live/index.m3u8",
        "http://cdn.example.com/vod/MASTER.M3U8?token=abc",
        "https://cdn.example.com/a.m3u8/segment",
        "https://vcloud.hudl.com/stream.m3u8",
        "https://www.youtube.com/watch?v=abc&fallback=x.m3u8",
    ] {
        assert_eq!(resolver.resolve(input).await, StreamSource::hls(input));
    }
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn direct_manifest_is_trimmed() {
    let resolver = resolver_with(Arc::new(ForbidNetwork::default()));
    assert_eq!(
        resolver.resolve("\n  https://cdn.example.com/x.m3u8 \t").await,
        StreamSource::hls("https://cdn.example.com/x.m3u8")
    );
}

// ─── Unparsable input ────────────────────────────────────────────────────────

#[tokio::test]
async fn unparsable_input_passes_through_as_hls() {
    let fetcher = Arc::new(ForbidNetwork::default());
    let resolver = resolver_with(fetcher.clone());

    for input in ["not a url", "abc123", "www.example.com/video", "/local/path.mp4"] {
        assert_eq!(resolver.resolve(input).await, StreamSource::hls(input));
    }
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unparsable_input_can_be_embedded_instead() {
    let config = Config {
        unparsable: UnparsablePolicy::WebEmbed,
        ..Config::default()
    };
    let resolver = Resolver::with_config(Arc::new(ForbidNetwork::default()), &config);
    assert_eq!(
        resolver.resolve("not a url").await,
        StreamSource::web_embed("not a url")
    );
}

// ─── YouTube ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn youtube_links_resolve_without_network() {
    let fetcher = Arc::new(ForbidNetwork::default());
    let resolver = resolver_with(fetcher.clone());

    assert_eq!(
        resolver.resolve("https://youtu.be/abc123").await,
        StreamSource::youtube("abc123")
    );
    assert_eq!(
        resolver.resolve("https://www.youtube.com/watch?v=xyz789").await,
        StreamSource::youtube("xyz789")
    );
    assert_eq!(
        resolver.resolve("https://www.youtube.com/live/liveID42").await,
        StreamSource::youtube("liveID42")
    );
    assert_eq!(
        resolver.resolve("https://www.youtube.com/embed/emb7").await,
        StreamSource::youtube("emb7")
    );
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn youtube_without_id_falls_through_to_page_sniffing() {
    let page = Arc::new(CannedPage::new("<html>no stream</html>"));
    let resolver = resolver_with(page.clone());

    let url = "https://www.youtube.com/watch?x=1";
    assert_eq!(resolver.resolve(url).await, StreamSource::web_embed(url));
    assert_eq!(page.requested(), vec![url.to_string()]);
}

// ─── Page sniffing ───────────────────────────────────────────────────────────

#[tokio::test]
async fn generic_page_with_embedded_manifest() {
    let page = Arc::new(CannedPage::new(
        r#"<html><video src="https://cdn.example.com/stream/index.m3u8?tok=1"></video></html>"#,
    ));
    let resolver = resolver_with(page.clone());

    assert_eq!(
        resolver.resolve("https://example.com/watch/42").await,
        StreamSource::hls("https://cdn.example.com/stream/index.m3u8?tok=1")
    );
    assert_eq!(page.requested(), vec!["https://example.com/watch/42".to_string()]);
}

#[tokio::test]
async fn generic_page_without_manifest_is_embedded() {
    let resolver = resolver_with(Arc::new(CannedPage::new("<html><p>hello</p></html>")));
    assert_eq!(
        resolver.resolve("https://example.com/watch/42").await,
        StreamSource::web_embed("https://example.com/watch/42")
    );
}

#[tokio::test]
async fn platform_page_with_manifest() {
    let page = Arc::new(CannedPage::new(
        "player.load('https://hudl-cdn.example.net/live/abc/playlist.m3u8');",
    ));
    let resolver = resolver_with(page);
    assert_eq!(
        resolver.resolve("https://fan.hudl.com/usa/team/broadcast/1").await,
        StreamSource::hls("https://hudl-cdn.example.net/live/abc/playlist.m3u8")
    );
}

#[tokio::test]
async fn platform_page_without_manifest_is_embedded() {
    let resolver = resolver_with(Arc::new(CannedPage::new("<html>sign in</html>")));
    assert_eq!(
        resolver.resolve("https://vcloud.hudl.com/broadcast/view/9").await,
        StreamSource::web_embed("https://vcloud.hudl.com/broadcast/view/9")
    );
}

#[tokio::test]
async fn fetch_errors_never_escape() {
    let resolver = resolver_with(Arc::new(Broken));
    for url in [
        "https://example.com/",
        "https://vcloud.hudl.com/broadcast/view/1",
        "https://www.youtube.com/channel/UCxyz",
        "ftp://files.example.com/movie",
    ] {
        assert_eq!(resolver.resolve(url).await, StreamSource::web_embed(url));
    }
}

#[tokio::test]
async fn hls_results_are_absolute_urls() {
    let resolver = resolver_with(Arc::new(CannedPage::new(
        r#"<source src="/relative/index.m3u8"><source src="https://abs.example/x.m3u8">"#,
    )));
    let source = resolver.resolve("https://example.com/page").await;
    let StreamSource::Hls { url, headers } = source else {
        panic!("expected Hls");
    };
    assert!(url::Url::parse(&url).is_ok());
    assert_eq!(url, "https://abs.example/x.m3u8");
    assert!(headers.is_empty());
}

// ─── Idempotence & concurrency ───────────────────────────────────────────────

#[tokio::test]
async fn resolving_twice_gives_the_same_answer() {
    let page = Arc::new(CannedPage::new("src=\"https://cdn.example.com/a.m3u8\""));
    let resolver = resolver_with(page.clone());

    let first = resolver.resolve("https://example.com/live").await;
    let second = resolver.resolve("https://example.com/live").await;
    assert_eq!(first, second);
    // No caching: both calls hit the page.
    assert_eq!(page.requested().len(), 2);
}

fn quad_fetcher() -> Delayed {
    Delayed::default()
        .page("https://one.example/", 120, Some("https://cdn.one/1.m3u8"))
        .page("https://two.example/", 10, Some("<html>nothing</html>"))
        .page("https://three.example/", 60, None)
        .page("https://four.example/", 30, Some("'https://cdn.four/4.m3u8'"))
}

fn quad_inputs() -> Vec<Option<String>> {
    [
        "https://one.example/",
        "https://two.example/",
        "https://three.example/",
        "https://four.example/",
    ]
    .into_iter()
    .map(|s| Some(s.to_string()))
    .collect()
}

#[tokio::test]
async fn four_concurrent_resolutions_keep_their_own_results() {
    let resolver = resolver_with(Arc::new(quad_fetcher()));

    let started = tokio::time::Instant::now();
    let results = resolver.resolve_all(&quad_inputs()).await;

    assert_eq!(
        results,
        vec![
            Some(StreamSource::hls("https://cdn.one/1.m3u8")),
            Some(StreamSource::web_embed("https://two.example/")),
            Some(StreamSource::web_embed("https://three.example/")),
            Some(StreamSource::hls("https://cdn.four/4.m3u8")),
        ]
    );
    // Run side by side, not one after another (120 + 10 + 60 + 30 ms).
    assert!(started.elapsed() < Duration::from_millis(220));
}

#[tokio::test]
async fn unordered_resolution_yields_fastest_first() {
    let resolver = resolver_with(Arc::new(quad_fetcher()));

    let finished: Vec<(usize, StreamSource)> =
        resolver.resolve_unordered(quad_inputs()).collect().await;

    let order: Vec<usize> = finished.iter().map(|(index, _)| *index).collect();
    assert_eq!(order, vec![1, 3, 2, 0]);
    assert_eq!(finished[3].1, StreamSource::hls("https://cdn.one/1.m3u8"));
}

#[tokio::test]
async fn spawned_resolutions_are_independent() {
    let resolver = Arc::new(resolver_with(Arc::new(quad_fetcher())));

    let handles: Vec<_> = quad_inputs()
        .into_iter()
        .flatten()
        .map(|input| {
            let resolver = Arc::clone(&resolver);
            tokio::spawn(async move { resolver.resolve(&input).await })
        })
        .collect();

    let mut kinds = Vec::new();
    for handle in handles {
        kinds.push(handle.await.unwrap().kind().to_string());
    }
    assert_eq!(kinds, vec!["hls", "web_embed", "web_embed", "hls"]);
}

#[tokio::test]
async fn abandoned_resolution_has_no_effect() {
    let resolver = resolver_with(Arc::new(
        Delayed::default().page("https://slow.example/", 5_000, Some("https://x/y.m3u8")),
    ));

    let abandoned =
        tokio::time::timeout(Duration::from_millis(20), resolver.resolve("https://slow.example/"))
            .await;
    assert!(abandoned.is_err());

    // The resolver is still usable for other inputs.
    assert_eq!(
        resolver.resolve("https://youtu.be/after").await,
        StreamSource::youtube("after")
    );
}

#[test]
fn dropping_a_pending_resolution_drops_the_request() {
    let fetcher = Arc::new(Hanging::default());
    let resolver = resolver_with(fetcher.clone());

    let mut task = tokio_test::task::spawn(resolver.resolve("https://example.com/live"));
    tokio_test::assert_pending!(task.poll());
    assert_eq!(fetcher.started.load(Ordering::SeqCst), 1);
    assert_eq!(fetcher.dropped.load(Ordering::SeqCst), 0);

    drop(task);
    assert_eq!(fetcher.dropped.load(Ordering::SeqCst), 1);
}
