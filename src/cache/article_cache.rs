//! Typed article reads and writes over a [`CacheService`].
//!
//! Writes land under the version-pinned key and the `latest` pointer. Reads
//! only ever consult `latest`. Every I/O error is logged here and never
//! reaches the resolution outcome.

use super::codec::KeyCodec;
use super::errors::{CacheError, CacheResult};
use super::provider::CacheProvider;
use super::traits::CacheService;
use crate::config::CacheConfig;
use crate::logging::log_cache_operation;
use crate::models::{CachedPayload, ContentKey, ResolvedItem, Source};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of one persist call, per key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteReport {
    pub written: Vec<String>,
    pub failed: Vec<(String, CacheError)>,
}

impl WriteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Collapse into the first failure, if any
    pub fn into_result(self) -> CacheResult<()> {
        match self.failed.into_iter().next() {
            Some((_, error)) => Err(error),
            None => Ok(()),
        }
    }
}

/// Payload as it may have been written by older writers
#[derive(Deserialize)]
struct StoredPayload {
    item: ResolvedItem,
    #[serde(default)]
    source_country: Option<Source>,
    #[serde(default)]
    cached_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct ArticleCache {
    service: Arc<dyn CacheService>,
    codec: KeyCodec,
    ttl: Duration,
}

impl std::fmt::Debug for ArticleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleCache")
            .field("provider", &self.service.provider_name())
            .field("codec", &self.codec)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl ArticleCache {
    pub fn new(service: Arc<dyn CacheService>, codec: KeyCodec, ttl: Duration) -> Self {
        Self {
            service,
            codec,
            ttl,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            Arc::new(CacheProvider::from_config(config)),
            KeyCodec::new(config.key_prefix.clone()),
            config.ttl(),
        )
    }

    pub fn codec(&self) -> &KeyCodec {
        &self.codec
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn provider_name(&self) -> &'static str {
        self.service.provider_name()
    }

    /// Write `item` under its version key and the `latest` pointer.
    ///
    /// Both writes run concurrently and fail independently. When the version
    /// is itself the `latest` token the two keys coincide and one write is made.
    pub async fn persist(&self, item: &ResolvedItem, source_country: &Source) -> WriteReport {
        let payload = CachedPayload {
            item: item.clone(),
            source_country: source_country.clone(),
            cached_at: Utc::now(),
        };

        let serialized = match serde_json::to_string(&payload) {
            Ok(serialized) => serialized,
            Err(e) => {
                let error = CacheError::from(e);
                warn!(error = %error, content_key = %item.content_key, "Failed to serialize cached payload");
                let key = self.codec.latest_key(&item.canonical_source, &item.content_key);
                return WriteReport {
                    written: Vec::new(),
                    failed: vec![(key, error)],
                };
            }
        };

        let version_key =
            self.codec
                .build_key(&item.canonical_source, &item.content_key, Some(&item.version));
        let latest_key = self.codec.latest_key(&item.canonical_source, &item.content_key);

        let results = if version_key == latest_key {
            vec![(latest_key.clone(), self.write_key(&latest_key, &serialized).await)]
        } else {
            let (version_result, latest_result) = futures::join!(
                self.write_key(&version_key, &serialized),
                self.write_key(&latest_key, &serialized)
            );
            vec![(version_key, version_result), (latest_key, latest_result)]
        };

        let mut report = WriteReport::default();
        for (key, result) in results {
            match result {
                Ok(()) => report.written.push(key),
                Err(error) => report.failed.push((key, error)),
            }
        }
        report
    }

    async fn write_key(&self, key: &str, serialized: &str) -> CacheResult<()> {
        match self.service.set(key, serialized, self.ttl).await {
            Ok(()) => {
                log_cache_operation("set", key, "ok", None);
                Ok(())
            }
            Err(error) => {
                warn!(key = key, error = %error, "Cache write failed");
                log_cache_operation("set", key, "error", Some(&error.to_string()));
                Err(error)
            }
        }
    }

    /// Read the `latest` pointer for one source.
    ///
    /// Misses, read errors and undecodable payloads all come back as `None`.
    /// A payload written without `source_country` is attributed to `source`.
    pub async fn read_latest(&self, source: &Source, content_key: &ContentKey) -> Option<CachedPayload> {
        let key = self.codec.latest_key(source, content_key);

        let raw = match self.service.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log_cache_operation("get", &key, "miss", None);
                return None;
            }
            Err(error) => {
                warn!(key = %key, error = %error, "Cache read failed");
                log_cache_operation("get", &key, "error", Some(&error.to_string()));
                return None;
            }
        };

        match serde_json::from_str::<StoredPayload>(&raw) {
            Ok(stored) => {
                log_cache_operation("get", &key, "hit", None);
                Some(CachedPayload {
                    item: stored.item,
                    source_country: stored.source_country.unwrap_or_else(|| source.clone()),
                    cached_at: stored.cached_at.unwrap_or_default(),
                })
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding undecodable cached payload");
                log_cache_operation("get", &key, "decode_error", Some(&e.to_string()));
                None
            }
        }
    }

    /// Walk `priority` in order and return the first `latest` hit.
    pub async fn find_stale(
        &self,
        priority: &[Source],
        content_key: &ContentKey,
    ) -> Option<(Source, CachedPayload)> {
        for source in priority {
            if let Some(payload) = self.read_latest(source, content_key).await {
                debug!(source = %source, content_key = %content_key, "Stale payload found");
                return Some((source.clone(), payload));
            }
        }
        None
    }

    /// Drop every cached version of one article, `latest` included.
    pub async fn invalidate_article(&self, source: &Source, content_key: &ContentKey) -> CacheResult<u64> {
        let pattern = self.codec.article_pattern(source, content_key);
        let removed = self.service.delete_pattern(&pattern).await?;
        log_cache_operation("delete_pattern", &pattern, "ok", Some(&format!("removed={removed}")));
        Ok(removed)
    }

    pub async fn health_check(&self) -> CacheResult<bool> {
        self.service.health_check().await
    }
}
