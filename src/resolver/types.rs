//! Resolution outcomes.

use crate::error::{FailureKind, ResolverError, SourceError};
use crate::models::{CachedPayload, ResolvedItem, Source};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

/// One source that failed transiently during a resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub source: Source,
    pub error: SourceError,
}

impl Failure {
    pub fn new(source: Source, error: SourceError) -> Self {
        Self { source, error }
    }

    pub fn kind(&self) -> Option<FailureKind> {
        self.error.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.error.status
    }
}

/// A cached payload served because every live source failed
#[derive(Debug, Clone, PartialEq)]
pub struct StaleArticle {
    pub item: ResolvedItem,
    /// Source whose cache entry was served
    pub source_country: Source,
    pub cached_at: DateTime<Utc>,
}

impl From<CachedPayload> for StaleArticle {
    fn from(payload: CachedPayload) -> Self {
        Self {
            item: payload.item,
            source_country: payload.source_country,
            cached_at: payload.cached_at,
        }
    }
}

/// Failures in attempt order, plus whatever stale payload was found afterwards
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateFailure {
    pub failures: Vec<Failure>,
    pub stale: Option<StaleArticle>,
}

impl AggregateFailure {
    pub fn push(&mut self, failure: Failure) {
        self.failures.push(failure);
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Comma-separated failing sources, in attempt order
    pub fn sources(&self) -> String {
        self.failures
            .iter()
            .map(|failure| failure.source.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Live content from the first source that had it
#[derive(Debug, Clone, PartialEq)]
pub struct FoundArticle {
    pub item: ResolvedItem,
    pub source_country: Source,
}

impl FoundArticle {
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.item.tags
    }

    pub fn version(&self) -> &str {
        &self.item.version
    }

    pub fn canonical_source(&self) -> &Source {
        &self.item.canonical_source
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemporaryFailure {
    pub error: ResolverError,
    pub aggregate: AggregateFailure,
}

impl TemporaryFailure {
    pub fn failures(&self) -> &[Failure] {
        &self.aggregate.failures
    }

    pub fn stale(&self) -> Option<&StaleArticle> {
        self.aggregate.stale.as_ref()
    }

    pub fn stale_item(&self) -> Option<&ResolvedItem> {
        self.stale().map(|stale| &stale.item)
    }

    pub fn stale_source_country(&self) -> Option<&Source> {
        self.stale().map(|stale| &stale.source_country)
    }
}

/// Terminal state of one resolution
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(FoundArticle),
    NotFound,
    TemporaryError(TemporaryFailure),
}

impl Resolution {
    pub fn outcome(&self) -> &'static str {
        match self {
            Resolution::Found(_) => "found",
            Resolution::NotFound => "not_found",
            Resolution::TemporaryError(failure) if failure.stale().is_some() => "stale",
            Resolution::TemporaryError(_) => "temporary_error",
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolution::NotFound)
    }

    pub fn found(&self) -> Option<&FoundArticle> {
        match self {
            Resolution::Found(found) => Some(found),
            _ => None,
        }
    }

    pub fn temporary_failure(&self) -> Option<&TemporaryFailure> {
        match self {
            Resolution::TemporaryError(failure) => Some(failure),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_sources_in_attempt_order() {
        let mut aggregate = AggregateFailure::default();
        aggregate.push(Failure::new(Source::new("ng"), SourceError::transport("reset")));
        aggregate.push(Failure::new(Source::new("za"), SourceError::upstream(502, "bad gateway")));

        assert_eq!(aggregate.sources(), "ng, za");
        assert_eq!(aggregate.failures[1].kind(), Some(FailureKind::Upstream5xx));
        assert_eq!(aggregate.failures[1].status(), Some(502));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Resolution::NotFound.outcome(), "not_found");
        let failure = TemporaryFailure {
            error: ResolverError::SourcesUnavailable {
                sources: "ng".to_string(),
            },
            aggregate: AggregateFailure::default(),
        };
        assert_eq!(Resolution::TemporaryError(failure).outcome(), "temporary_error");
    }
}
