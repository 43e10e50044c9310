//! Mock collaborators
//!
//! `ScriptedSourceClient` answers from a per-(source, key) script and records
//! every call. The cache mocks either fail every operation or record them on
//! top of a real moka backend.

use async_trait::async_trait;
use edition_resolver::cache::{CacheError, CacheResult, CacheService, MokaCacheService};
use edition_resolver::error::SourceError;
use edition_resolver::models::{Article, ContentKey, Source};
use edition_resolver::sources::{FetchOutcome, SourceClient};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct FetchCall {
    pub source: Source,
    pub content_key: ContentKey,
    pub preview: bool,
}

#[derive(Debug, Default)]
pub struct ScriptedClientState {
    pub responses: HashMap<Source, Result<FetchOutcome, SourceError>>,
    pub calls: Vec<FetchCall>,
}

/// Source client answering from a script; unscripted sources answer `NotFound`
#[derive(Debug, Clone, Default)]
pub struct ScriptedSourceClient {
    state: Arc<Mutex<ScriptedClientState>>,
}

impl ScriptedSourceClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn found(self, source: &str, article: Article) -> Self {
        self.script(source, Ok(FetchOutcome::Found(article)))
    }

    pub fn not_found(self, source: &str) -> Self {
        self.script(source, Ok(FetchOutcome::NotFound))
    }

    pub fn failing(self, source: &str, error: SourceError) -> Self {
        self.script(source, Err(error))
    }

    pub fn script(self, source: &str, response: Result<FetchOutcome, SourceError>) -> Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert(Source::new(source), response);
        self
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn called_sources(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|call| call.source.to_string())
            .collect()
    }
}

#[async_trait]
impl SourceClient for ScriptedSourceClient {
    async fn fetch(
        &self,
        source: &Source,
        content_key: &ContentKey,
        preview: bool,
    ) -> Result<FetchOutcome, SourceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(FetchCall {
            source: source.clone(),
            content_key: content_key.clone(),
            preview,
        });
        state
            .responses
            .get(source)
            .cloned()
            .unwrap_or(Ok(FetchOutcome::NotFound))
    }
}

/// Cache backend whose every operation fails
#[derive(Debug, Clone, Default)]
pub struct FailingCacheService;

#[async_trait]
impl CacheService for FailingCacheService {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn delete_pattern(&self, _pattern: &str) -> CacheResult<u64> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(false)
    }

    fn provider_name(&self) -> &'static str {
        "failing"
    }
}

/// Moka-backed cache that records which keys were read and written
#[derive(Debug, Clone)]
pub struct RecordingCacheService {
    inner: MokaCacheService,
    pub gets: Arc<Mutex<Vec<String>>>,
    pub sets: Arc<Mutex<Vec<String>>>,
}

impl Default for RecordingCacheService {
    fn default() -> Self {
        Self {
            inner: MokaCacheService::new(1_000, Duration::from_secs(300)),
            gets: Arc::default(),
            sets: Arc::default(),
        }
    }
}

impl RecordingCacheService {
    pub fn get_keys(&self) -> Vec<String> {
        self.gets.lock().unwrap().clone()
    }

    pub fn set_keys(&self) -> Vec<String> {
        self.sets.lock().unwrap().clone()
    }
}

#[async_trait]
impl CacheService for RecordingCacheService {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.gets.lock().unwrap().push(key.to_string());
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.sets.lock().unwrap().push(key.to_string());
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.inner.delete(key).await
    }

    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64> {
        self.inner.delete_pattern(pattern).await
    }

    async fn health_check(&self) -> CacheResult<bool> {
        self.inner.health_check().await
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}
