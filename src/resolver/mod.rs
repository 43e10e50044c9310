//! # Article Resolver
//!
//! Resolves an article for an edition by trying sources in priority order.
//!
//! ```text
//! resolve(primary, key)
//!   → PriorityBuilder::build_priority(primary)
//!   → for source in list: SourceClient::fetch
//!        Found          → schedule cache write (unless preview) → Found
//!        NotFound       → next source
//!        Err(transient) → record Failure → next source
//!   → exhausted: failures && !preview → stale lookup over the same order
//!                failures &&  preview → TemporaryError, no stale fields
//!                no failures          → NotFound
//! ```
//!
//! Sources are tried strictly one at a time; the first success wins and lower
//! priority sources are never contacted after it.

mod builder;
pub mod types;

pub use builder::ArticleResolverBuilder;
pub use types::{
    AggregateFailure, Failure, FoundArticle, Resolution, StaleArticle, TemporaryFailure,
};

use crate::cache::{content_tags, derive_version, ArticleCache};
use crate::config::ResolverConfig;
use crate::error::{ResolverError, Result, SourceError};
use crate::logging::log_resolution_outcome;
use crate::models::{Article, ContentKey, ResolvedItem, Source};
use crate::scheduler::WriteScheduler;
use crate::sources::{
    FetchOutcome, GuardedSourceClient, PriorityBuilder, PriorityCache, PriorityList,
    SourceClient, SourceRegistry,
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

pub struct ArticleResolver {
    priority: Arc<PriorityBuilder>,
    client: Arc<dyn SourceClient>,
    cache: ArticleCache,
    scheduler: Arc<WriteScheduler>,
}

impl std::fmt::Debug for ArticleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleResolver")
            .field("priority", &self.priority)
            .field("cache", &self.cache)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

impl ArticleResolver {
    pub fn builder() -> ArticleResolverBuilder {
        ArticleResolverBuilder::default()
    }

    /// Wire every collaborator from configuration.
    ///
    /// With `circuit_breaker` configured the client is wrapped in a
    /// [`GuardedSourceClient`].
    pub fn from_config(config: &ResolverConfig, client: Arc<dyn SourceClient>) -> Result<Self> {
        config.validate()?;

        let client: Arc<dyn SourceClient> = match &config.circuit_breaker {
            Some(settings) => Arc::new(GuardedSourceClient::new(
                client,
                settings.to_resilience_config(),
            )),
            None => client,
        };

        Self::builder()
            .registry(Arc::new(SourceRegistry::from_config(config)))
            .priority_cache(Arc::new(PriorityCache::new()))
            .client(client)
            .cache(ArticleCache::from_config(&config.cache))
            .scheduler(Arc::new(WriteScheduler::new(
                config.scheduler.max_concurrent_writes,
            )))
            .build()
    }

    pub(crate) fn from_parts(
        priority: Arc<PriorityBuilder>,
        client: Arc<dyn SourceClient>,
        cache: ArticleCache,
        scheduler: Arc<WriteScheduler>,
    ) -> Self {
        Self {
            priority,
            client,
            cache,
            scheduler,
        }
    }

    pub fn priority_builder(&self) -> &Arc<PriorityBuilder> {
        &self.priority
    }

    pub fn cache(&self) -> &ArticleCache {
        &self.cache
    }

    pub fn scheduler(&self) -> &Arc<WriteScheduler> {
        &self.scheduler
    }

    /// Resolve `content_key` for the edition `primary`
    ///
    /// Cache writes triggered here run on the Tokio runtime captured when the
    /// scheduler was built, falling back to the caller's runtime.
    #[instrument(skip(self), fields(request_id = %Uuid::new_v4()))]
    pub async fn resolve(&self, primary: &str, content_key: &str, preview: bool) -> Resolution {
        let priority = self.priority.build_priority(primary);
        self.load_article_with_fallback(&ContentKey::new(content_key), &priority, preview)
            .await
    }

    /// Resolve against a caller-supplied source order instead of a built one
    #[instrument(skip(self, sources), fields(request_id = %Uuid::new_v4()))]
    pub async fn resolve_with_priority<I>(&self, content_key: &str, sources: I, preview: bool) -> Resolution
    where
        I: IntoIterator<Item = Source> + Send,
    {
        let priority = PriorityList::explicit(sources);
        self.load_article_with_fallback(&ContentKey::new(content_key), &priority, preview)
            .await
    }

    /// Fetch from a single source.
    ///
    /// A source without an endpoint answers `NotFound` without the client
    /// being called.
    pub async fn load_article(
        &self,
        source: &Source,
        content_key: &ContentKey,
        preview: bool,
    ) -> std::result::Result<FetchOutcome, SourceError> {
        if !self.priority.registry().is_configured(source) {
            debug!(source = %source, "Source has no endpoint, treating as not found");
            return Ok(FetchOutcome::NotFound);
        }
        self.client.fetch(source, content_key, preview).await
    }

    /// Try each source of `priority` in order until one has the article.
    pub async fn load_article_with_fallback(
        &self,
        content_key: &ContentKey,
        priority: &PriorityList,
        preview: bool,
    ) -> Resolution {
        if content_key.is_empty() {
            debug!("Empty content key, nothing to resolve");
            return Resolution::NotFound;
        }

        let mut aggregate = AggregateFailure::default();
        let mut attempted = 0;

        for source in priority {
            attempted += 1;
            match self.load_article(source, content_key, preview).await {
                Ok(FetchOutcome::Found(article)) => {
                    let found = self.found(source, content_key, article, preview);
                    log_resolution_outcome(
                        content_key.as_str(),
                        "found",
                        Some(source.as_str()),
                        attempted,
                        aggregate.len(),
                        false,
                    );
                    return Resolution::Found(found);
                }
                Ok(FetchOutcome::NotFound) => {
                    debug!(source = %source, content_key = %content_key, "Article not found at source");
                }
                Err(error) => {
                    warn!(
                        source = %source,
                        content_key = %content_key,
                        error = %error,
                        kind = ?error.kind,
                        status = ?error.status,
                        "Source fetch failed"
                    );
                    aggregate.push(Failure::new(source.clone(), error));
                }
            }
        }

        if aggregate.is_empty() {
            log_resolution_outcome(content_key.as_str(), "not_found", None, attempted, 0, false);
            return Resolution::NotFound;
        }

        if !preview {
            if let Some((source, payload)) = self.cache.find_stale(priority.as_slice(), content_key).await {
                warn!(
                    source = %source,
                    content_key = %content_key,
                    failures = aggregate.len(),
                    "All sources failed, serving stale article"
                );
                aggregate.stale = Some(StaleArticle::from(payload));
            }
        }

        let resolution = Resolution::TemporaryError(TemporaryFailure {
            error: ResolverError::SourcesUnavailable {
                sources: aggregate.sources(),
            },
            aggregate,
        });

        if let Some(failure) = resolution.temporary_failure() {
            log_resolution_outcome(
                content_key.as_str(),
                resolution.outcome(),
                failure.stale_source_country().map(Source::as_str),
                attempted,
                failure.failures().len(),
                failure.stale().is_some(),
            );
        }
        resolution
    }

    fn found(
        &self,
        source: &Source,
        content_key: &ContentKey,
        article: Article,
        preview: bool,
    ) -> FoundArticle {
        let item = ResolvedItem {
            version: derive_version(&article),
            tags: content_tags(source, content_key, article.id),
            canonical_source: source.clone(),
            content_key: content_key.clone(),
            article,
        };

        if !preview {
            let cache = self.cache.clone();
            let pending = item.clone();
            let source_country = source.clone();
            self.scheduler.submit(
                self.cache.codec().latest_key(source, content_key),
                async move { cache.persist(&pending, &source_country).await.into_result() },
            );
        }

        FoundArticle {
            item,
            source_country: source.clone(),
        }
    }
}
