use super::ArticleResolver;
use crate::cache::ArticleCache;
use crate::config::CacheConfig;
use crate::constants::scheduler::DEFAULT_MAX_CONCURRENT_WRITES;
use crate::error::{ResolverError, Result};
use crate::scheduler::WriteScheduler;
use crate::sources::{PriorityBuilder, PriorityCache, SourceClient, SourceRegistry};
use std::sync::Arc;

/// Assembles an [`ArticleResolver`] from explicit collaborators.
///
/// A registry and a client are required. The priority cache, article cache
/// and write scheduler default to fresh instances.
#[derive(Default)]
pub struct ArticleResolverBuilder {
    registry: Option<Arc<SourceRegistry>>,
    priority_cache: Option<Arc<PriorityCache>>,
    client: Option<Arc<dyn SourceClient>>,
    cache: Option<ArticleCache>,
    scheduler: Option<Arc<WriteScheduler>>,
}

impl ArticleResolverBuilder {
    pub fn registry(mut self, registry: Arc<SourceRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Share a priority cache across resolvers
    pub fn priority_cache(mut self, cache: Arc<PriorityCache>) -> Self {
        self.priority_cache = Some(cache);
        self
    }

    pub fn client(mut self, client: Arc<dyn SourceClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn cache(mut self, cache: ArticleCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<WriteScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn build(self) -> Result<ArticleResolver> {
        let registry = self.registry.ok_or_else(|| {
            ResolverError::Configuration("resolver requires a source registry".to_string())
        })?;
        let client = self.client.ok_or_else(|| {
            ResolverError::Configuration("resolver requires a source client".to_string())
        })?;

        let priority = Arc::new(PriorityBuilder::new(
            registry,
            self.priority_cache.unwrap_or_default(),
        ));
        let cache = self
            .cache
            .unwrap_or_else(|| ArticleCache::from_config(&CacheConfig::default()));
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Arc::new(WriteScheduler::new(DEFAULT_MAX_CONCURRENT_WRITES)));

        Ok(ArticleResolver::from_parts(priority, client, cache, scheduler))
    }
}
