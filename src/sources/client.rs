//! Source client collaborator.
//!
//! Transport lives outside the engine. Implementations classify each call as
//! found, not found, or a retryable-elsewhere [`SourceError`]; timeouts are
//! theirs to enforce.

use crate::error::SourceError;
use crate::models::{Article, ContentKey, Source};
use crate::resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Healthy answer from a source
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Found(Article),
    /// The source is up but has no such item
    NotFound,
}

#[async_trait]
pub trait SourceClient: Send + Sync {
    async fn fetch(
        &self,
        source: &Source,
        content_key: &ContentKey,
        preview: bool,
    ) -> Result<FetchOutcome, SourceError>;
}

/// Wraps a client with one circuit breaker per source.
///
/// While a source's breaker is open its calls fail fast with
/// `FailureKind::CircuitOpen`. `NotFound` counts as a healthy response.
pub struct GuardedSourceClient {
    inner: Arc<dyn SourceClient>,
    config: CircuitBreakerConfig,
    breakers: DashMap<Source, Arc<CircuitBreaker>>,
}

impl std::fmt::Debug for GuardedSourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedSourceClient")
            .field("config", &self.config)
            .field("breakers", &self.breakers.len())
            .finish()
    }
}

impl GuardedSourceClient {
    pub fn new(inner: Arc<dyn SourceClient>, config: CircuitBreakerConfig) -> Self {
        Self {
            inner,
            config,
            breakers: DashMap::new(),
        }
    }

    /// Breaker for `source`, created closed on first use
    pub fn breaker(&self, source: &Source) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(source.clone())
            .or_insert_with(|| {
                Arc::new(CircuitBreaker::new(
                    format!("source:{source}"),
                    self.config.clone(),
                ))
            })
            .clone()
    }

    pub fn breaker_state(&self, source: &Source) -> Option<CircuitState> {
        self.breakers.get(source).map(|breaker| breaker.state())
    }
}

#[async_trait]
impl SourceClient for GuardedSourceClient {
    async fn fetch(
        &self,
        source: &Source,
        content_key: &ContentKey,
        preview: bool,
    ) -> Result<FetchOutcome, SourceError> {
        let breaker = self.breaker(source);
        if !breaker.should_allow() {
            warn!(source = %source, content_key = %content_key, "Source circuit open, skipping fetch");
            return Err(SourceError::circuit_open(source.as_str()));
        }

        let start = Instant::now();
        let result = self.inner.fetch(source, content_key, preview).await;
        match &result {
            Ok(_) => breaker.record_success_manual(start.elapsed()),
            Err(_) => breaker.record_failure_manual(start.elapsed()),
        }
        result
    }
}
