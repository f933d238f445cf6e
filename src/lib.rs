//! `FilmViewer` - stream source resolution for a TV video player
//!
//! # Features
//!
//! - **Direct manifests**: `.m3u8` links play natively without any network access
//! - **YouTube**: `youtu.be`, `watch?v=`, `/live/` and `/embed/` links map to a video id
//! - **Page sniffing**: other pages are fetched once and scanned for an embedded manifest
//! - **Always an answer**: anything undecidable falls back to a web-view embed
//! - **Quad view**: up to four inputs resolved concurrently and independently
//!
//! # Example
//!
//! ```rust,no_run
//! use filmviewer::{Config, Resolver};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let resolver = Resolver::http(&Config::load()?)?;
//!     let source = resolver.resolve("https://www.youtube.com/watch?v=xyz789").await;
//!     println!("{source}");
//!     Ok(())
//! }
//! ```

pub mod applink;
pub mod config;
pub mod embed;
pub mod error;
pub mod http_client;
pub mod resolver;
pub mod scan;
pub mod source;
pub mod youtube;

pub use applink::{decode_queue, parse_entry, LinkTarget, QuadLink};
pub use config::{Config, UnparsablePolicy};
pub use error::{Error, Result};
pub use http_client::{probe_manifest, HttpFetcher, PageFetcher};
pub use resolver::{CachedResolver, Candidate, ResolveRule, Resolver, RuleOutcome};
pub use source::{SourceKind, StreamSource};

/// Version of filmviewer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
