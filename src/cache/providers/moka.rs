//! In-memory cache provider using Moka
//!
//! In-process only: each instance holds its own entries. All entries share the
//! TTL configured at construction time.

use crate::cache::errors::CacheResult;
use crate::cache::traits::CacheService;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct MokaCacheService {
    cache: moka::future::Cache<String, String>,
    default_ttl: Duration,
}

impl std::fmt::Debug for MokaCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheService")
            .field("max_capacity", &self.cache.policy().max_capacity())
            .field("entry_count", &self.cache.entry_count())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl MokaCacheService {
    pub fn new(max_capacity: u64, default_ttl: Duration) -> Self {
        let cache = moka::future::Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(default_ttl)
            .build();

        debug!(
            max_capacity = max_capacity,
            ttl_seconds = default_ttl.as_secs(),
            "Moka in-memory cache service created"
        );

        Self { cache, default_ttl }
    }

    /// Flush pending evictions and expirations
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl CacheService for MokaCacheService {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let result = self.cache.get(key).await;

        if result.is_some() {
            debug!(key = key, "Cache HIT (moka)");
        } else {
            debug!(key = key, "Cache MISS (moka)");
        }

        Ok(result)
    }

    async fn set(&self, key: &str, value: &str, _ttl: Duration) -> CacheResult<()> {
        // Moka applies the cache-level TTL, not a per-entry one
        self.cache.insert(key.to_string(), value.to_string()).await;

        debug!(
            key = key,
            ttl_seconds = self.default_ttl.as_secs(),
            "Cache SET (moka)"
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.cache.invalidate(key).await;
        debug!(key = key, "Cache DEL (moka)");
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let matching: Vec<String> = match pattern.strip_suffix('*') {
            Some(prefix) => self
                .cache
                .iter()
                .filter(|(key, _)| key.starts_with(prefix))
                .map(|(key, _)| key.as_ref().clone())
                .collect(),
            None => self
                .cache
                .contains_key(pattern)
                .then(|| pattern.to_string())
                .into_iter()
                .collect(),
        };

        for key in &matching {
            self.cache.invalidate(key).await;
        }

        debug!(
            pattern = pattern,
            removed = matching.len(),
            "Cache DEL pattern (moka)"
        );
        Ok(matching.len() as u64)
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "moka"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_moka_get_returns_none_on_miss() {
        let svc = MokaCacheService::new(100, Duration::from_secs(60));
        assert_eq!(svc.get("nonexistent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_moka_set_get_delete() {
        let svc = MokaCacheService::new(100, Duration::from_secs(60));
        let key = "article:ng:budget-speech:latest";

        svc.set(key, r#"{"title":"x"}"#, Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(svc.get(key).await.unwrap().as_deref(), Some(r#"{"title":"x"}"#));

        svc.delete(key).await.unwrap();
        assert!(svc.get(key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_moka_delete_pattern_by_prefix() {
        let svc = MokaCacheService::new(100, Duration::from_secs(60));
        let ttl = Duration::from_secs(60);
        svc.set("article:ng:budget:latest", "a", ttl).await.unwrap();
        svc.set("article:ng:budget:2024-01-01", "b", ttl).await.unwrap();
        svc.set("article:za:budget:latest", "c", ttl).await.unwrap();
        svc.run_pending_tasks().await;

        let removed = svc.delete_pattern("article:ng:budget:*").await.unwrap();
        assert_eq!(removed, 2);
        assert!(svc.get("article:ng:budget:latest").await.unwrap().is_none());
        assert!(svc.get("article:za:budget:latest").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_moka_delete_pattern_exact_key() {
        let svc = MokaCacheService::new(100, Duration::from_secs(60));
        svc.set("k", "v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(svc.delete_pattern("k").await.unwrap(), 1);
        assert_eq!(svc.delete_pattern("k").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_moka_ttl_expiry() {
        let svc = MokaCacheService::new(100, Duration::from_millis(50));
        svc.set("expiring", "value", Duration::from_millis(50))
            .await
            .unwrap();
        assert!(svc.get("expiring").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;
        svc.run_pending_tasks().await;

        assert!(svc.get("expiring").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_moka_debug_format() {
        let svc = MokaCacheService::new(100, Duration::from_secs(60));
        let rendered = format!("{svc:?}");
        assert!(rendered.contains("MokaCacheService"));
        assert_eq!(svc.provider_name(), "moka");
    }
}
