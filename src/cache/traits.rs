//! Cache service trait definition

use super::errors::CacheResult;
use async_trait::async_trait;
use std::time::Duration;

/// Key/value operations the engine needs from a cache backend.
///
/// Object safe so the resolver can hold `Arc<dyn CacheService>` and tests can
/// swap in failing or recording backends.
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns `Ok(Some(value))` on hit, `Ok(None)` on miss.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Set a value with a TTL
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Delete every key matching `pattern`, where a trailing `*` matches any suffix.
    /// Returns the number of keys removed.
    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64>;

    async fn health_check(&self) -> CacheResult<bool>;

    fn provider_name(&self) -> &'static str;
}
