//! Error types for the resolution engine.
//!
//! Expected conditions (a source lacking an article, a source being down, the
//! cache misbehaving) never surface as `Err` from the resolver. They are folded
//! into a [`crate::resolver::Resolution`]. The types here carry the detail that
//! ends up inside those outcomes, plus the crate-level error used at
//! construction and configuration time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a transient source failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connection refused, DNS failure, reset, TLS error
    Transport,
    /// The back-end answered with a server-side status
    Upstream5xx,
    /// The client gave up waiting
    Timeout,
    /// The per-source circuit breaker rejected the call
    CircuitOpen,
    /// The back-end answered but the body could not be decoded
    Decode,
}

impl FailureKind {
    /// Map a numeric response status onto a failure kind.
    ///
    /// Only server-side statuses classify; anything else is the client's business.
    pub fn from_status(status: u16) -> Option<Self> {
        (500..600).contains(&status).then_some(FailureKind::Upstream5xx)
    }

    /// Whether the failure originated on the back-end rather than on the way to it.
    pub fn is_server_side(&self) -> bool {
        matches!(self, FailureKind::Upstream5xx | FailureKind::Decode)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::Upstream5xx => "upstream_5xx",
            FailureKind::Timeout => "timeout",
            FailureKind::CircuitOpen => "circuit_open",
            FailureKind::Decode => "decode",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A retryable-elsewhere failure reported by a source client.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct SourceError {
    pub message: String,
    pub kind: Option<FailureKind>,
    pub status: Option<u16>,
}

impl SourceError {
    /// Unclassified failure
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: None,
            status: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: Some(FailureKind::Transport),
            status: None,
        }
    }

    /// Server-side failure carrying the numeric status the back-end answered with.
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: FailureKind::from_status(status),
            status: Some(status),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: Some(FailureKind::Timeout),
            status: None,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: Some(FailureKind::Decode),
            status: None,
        }
    }

    pub fn circuit_open(source: &str) -> Self {
        Self {
            message: format!("circuit breaker open for source {source}"),
            kind: Some(FailureKind::CircuitOpen),
            status: None,
        }
    }
}

/// Crate-level error for construction, configuration and explicit cache calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolverError {
    #[error("All sources unavailable: {sources}")]
    SourcesUnavailable { sources: String },
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Cache error: {0}")]
    Cache(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<crate::config::ConfigurationError> for ResolverError {
    fn from(error: crate::config::ConfigurationError) -> Self {
        ResolverError::Configuration(error.to_string())
    }
}

impl From<crate::cache::CacheError> for ResolverError {
    fn from(error: crate::cache::CacheError) -> Self {
        ResolverError::Cache(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ResolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(FailureKind::from_status(503), Some(FailureKind::Upstream5xx));
        assert_eq!(FailureKind::from_status(500), Some(FailureKind::Upstream5xx));
        assert_eq!(FailureKind::from_status(404), None);
        assert_eq!(FailureKind::from_status(200), None);
    }

    #[test]
    fn test_upstream_error_carries_status_and_kind() {
        let err = SourceError::upstream(502, "bad gateway");
        assert_eq!(err.status, Some(502));
        assert_eq!(err.kind, Some(FailureKind::Upstream5xx));
        assert_eq!(err.to_string(), "bad gateway");
    }

    #[test]
    fn test_circuit_open_message() {
        let err = SourceError::circuit_open("ng");
        assert_eq!(err.kind, Some(FailureKind::CircuitOpen));
        assert!(err.message.contains("ng"));
    }

    #[test]
    fn test_server_side_kinds() {
        assert!(FailureKind::Upstream5xx.is_server_side());
        assert!(!FailureKind::Transport.is_server_side());
        assert!(!FailureKind::CircuitOpen.is_server_side());
    }

    #[test]
    fn test_resolver_error_display() {
        let err = ResolverError::SourcesUnavailable {
            sources: "ng, za".to_string(),
        };
        assert_eq!(err.to_string(), "All sources unavailable: ng, za");
    }
}
