//! Cache provider chosen from configuration
//!
//! Enum dispatch over the concrete providers. Construction never fails: a
//! disabled cache or an unrecognized backend name degrades to NoOp.

use super::errors::CacheResult;
use super::providers::{MokaCacheService, NoOpCacheService};
use super::traits::CacheService;
use crate::config::CacheConfig;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
enum CacheBackend {
    Moka(Box<MokaCacheService>),
    NoOp(NoOpCacheService),
}

#[derive(Debug, Clone)]
pub struct CacheProvider {
    backend: CacheBackend,
}

impl CacheProvider {
    /// Create a provider from configuration with graceful degradation
    pub fn from_config(config: &CacheConfig) -> Self {
        if !config.enabled {
            info!("Article cache disabled by configuration");
            return Self::noop();
        }

        let backend = match config.backend.to_lowercase().as_str() {
            "moka" | "memory" | "in-memory" => {
                info!(
                    backend = "moka",
                    max_capacity = config.max_capacity,
                    ttl_seconds = config.ttl_seconds,
                    "In-memory cache provider initialized successfully"
                );
                CacheBackend::Moka(Box::new(MokaCacheService::new(
                    config.max_capacity,
                    config.ttl(),
                )))
            }
            "noop" | "none" => CacheBackend::NoOp(NoOpCacheService::new()),
            other => {
                warn!(backend = other, "Unknown cache backend, falling back to NoOp");
                CacheBackend::NoOp(NoOpCacheService::new())
            }
        };

        Self { backend }
    }

    pub fn noop() -> Self {
        Self {
            backend: CacheBackend::NoOp(NoOpCacheService::new()),
        }
    }

    /// Whether this provider actually stores anything
    pub fn is_enabled(&self) -> bool {
        !matches!(self.backend, CacheBackend::NoOp(_))
    }
}

#[async_trait]
impl CacheService for CacheProvider {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        match &self.backend {
            CacheBackend::Moka(s) => s.get(key).await,
            CacheBackend::NoOp(s) => s.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        match &self.backend {
            CacheBackend::Moka(s) => s.set(key, value, ttl).await,
            CacheBackend::NoOp(s) => s.set(key, value, ttl).await,
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        match &self.backend {
            CacheBackend::Moka(s) => s.delete(key).await,
            CacheBackend::NoOp(s) => s.delete(key).await,
        }
    }

    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64> {
        match &self.backend {
            CacheBackend::Moka(s) => s.delete_pattern(pattern).await,
            CacheBackend::NoOp(s) => s.delete_pattern(pattern).await,
        }
    }

    async fn health_check(&self) -> CacheResult<bool> {
        match &self.backend {
            CacheBackend::Moka(s) => s.health_check().await,
            CacheBackend::NoOp(s) => s.health_check().await,
        }
    }

    fn provider_name(&self) -> &'static str {
        match &self.backend {
            CacheBackend::Moka(s) => s.provider_name(),
            CacheBackend::NoOp(s) => s.provider_name(),
        }
    }
}
