//! Configuration and resolver fixtures

use super::mocks::ScriptedSourceClient;
use edition_resolver::cache::{ArticleCache, CacheService, CacheError, KeyCodec};
use edition_resolver::config::{ResolverConfig, SourceConfig, SourceKind};
use edition_resolver::models::Article;
use edition_resolver::resolver::ArticleResolver;
use edition_resolver::scheduler::{ErrorSink, WriteScheduler};
use edition_resolver::sources::SourceRegistry;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// ng, za and gh configured; ke declared without an endpoint; global catch-all
pub fn edition_config() -> ResolverConfig {
    ResolverConfig {
        sources: vec![
            SourceConfig::country("ng", Some("https://ng.example.com")),
            SourceConfig::country("za", Some("https://za.example.com")),
            SourceConfig::country("ke", None),
            SourceConfig::country("gh", Some("https://gh.example.com")),
            SourceConfig {
                code: "global".to_string(),
                kind: SourceKind::Global,
                endpoint: Some("https://www.example.com".to_string()),
            },
        ],
        global_alias: Some("global".to_string()),
        aliases: BTreeMap::from([("africa".to_string(), "ng".to_string())]),
        ..ResolverConfig::default()
    }
}

pub fn article(slug: &str) -> Article {
    Article::new(slug, format!("Title of {slug}"))
        .with_id(1042)
        .with_published("2024-05-01T06:00:00Z")
        .with_modified("2024-05-02T09:15:00Z")
        .with_content(serde_json::json!({ "body": "<p>content</p>" }))
}

/// Error sink collecting every reported failure
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub reports: Mutex<Vec<(String, CacheError)>>,
}

impl ErrorSink for CollectingSink {
    fn report(&self, label: &str, error: &CacheError) {
        self.reports
            .lock()
            .unwrap()
            .push((label.to_string(), error.clone()));
    }
}

impl CollectingSink {
    pub fn len(&self) -> usize {
        self.reports.lock().unwrap().len()
    }
}

pub struct Harness {
    pub resolver: ArticleResolver,
    pub client: ScriptedSourceClient,
    pub sink: Arc<CollectingSink>,
}

impl Harness {
    pub fn new(client: ScriptedSourceClient, cache: Arc<dyn CacheService>) -> Self {
        Self::with_config(&edition_config(), client, cache)
    }

    pub fn with_config(
        config: &ResolverConfig,
        client: ScriptedSourceClient,
        cache: Arc<dyn CacheService>,
    ) -> Self {
        let sink = Arc::new(CollectingSink::default());
        let resolver = ArticleResolver::builder()
            .registry(Arc::new(SourceRegistry::from_config(config)))
            .client(Arc::new(client.clone()))
            .cache(ArticleCache::new(
                cache,
                KeyCodec::default(),
                Duration::from_secs(300),
            ))
            .scheduler(Arc::new(WriteScheduler::with_sink(4, sink.clone())))
            .build()
            .expect("resolver should build");

        Self {
            resolver,
            client,
            sink,
        }
    }

    /// Await every scheduled cache write
    pub async fn settle(&self) {
        self.resolver.scheduler().wait_idle().await;
    }
}
