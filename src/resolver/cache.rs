use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

use super::Resolver;
use crate::source::StreamSource;

struct Entry {
    resolved_at: Instant,
    source: StreamSource,
}

/// [`Resolver`] with a time-bounded memo keyed on the trimmed input.
///
/// Two concurrent misses for the same input may both fetch; the later
/// result overwrites the earlier one.
pub struct CachedResolver {
    inner: Resolver,
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
}

impl CachedResolver {
    pub fn new(inner: Resolver, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn resolve(&self, raw: &str) -> StreamSource {
        let key = raw.trim();

        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(key) {
                if entry.resolved_at.elapsed() < self.ttl {
                    debug!("Cache hit: {}", key);
                    return entry.source.clone();
                }
            }
        }

        let source = self.inner.resolve(key).await;

        let mut entries = self.entries.write().await;
        Self::retain_fresh(&mut entries, self.ttl);
        entries.insert(
            key.to_string(),
            Entry {
                resolved_at: Instant::now(),
                source: source.clone(),
            },
        );

        source
    }

    /// Drop expired entries.
    pub async fn purge_expired(&self) {
        Self::retain_fresh(&mut *self.entries.write().await, self.ttl);
    }

    fn retain_fresh(entries: &mut HashMap<String, Entry>, ttl: Duration) {
        let before = entries.len();
        entries.retain(|_, entry| entry.resolved_at.elapsed() < ttl);
        if entries.len() < before {
            debug!("Evicted {} expired entries", before - entries.len());
        }
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
