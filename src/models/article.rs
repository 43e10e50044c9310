//! Article payloads.

use crate::models::{ContentKey, Source};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Content as returned by a regional back-end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Numeric id within the back-end, when it exposes one
    #[serde(default)]
    pub id: Option<u64>,
    pub slug: String,
    #[serde(default)]
    pub title: String,
    /// Last-modified timestamp exactly as the back-end reported it
    #[serde(default)]
    pub modified: Option<String>,
    /// Publish timestamp exactly as the back-end reported it
    #[serde(default)]
    pub published: Option<String>,
    /// Remaining back-end fields, opaque to the engine
    #[serde(default)]
    pub content: serde_json::Value,
}

impl Article {
    pub fn new(slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: None,
            slug: slug.into(),
            title: title.into(),
            modified: None,
            published: None,
            content: serde_json::Value::Null,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_modified(mut self, modified: impl Into<String>) -> Self {
        self.modified = Some(modified.into());
        self
    }

    pub fn with_published(mut self, published: impl Into<String>) -> Self {
        self.published = Some(published.into());
        self
    }

    pub fn with_content(mut self, content: serde_json::Value) -> Self {
        self.content = content;
        self
    }
}

/// A successfully fetched article plus the identity the cache derives from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedItem {
    pub article: Article,
    /// Source the article was fetched from
    pub canonical_source: Source,
    pub content_key: ContentKey,
    /// Sanitized version segment (`latest` when nothing better is known)
    pub version: String,
    /// Opaque invalidation labels
    pub tags: BTreeSet<String>,
}

/// What the cache holds for one successful resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedPayload {
    pub item: ResolvedItem,
    /// Source that actually produced the payload
    pub source_country: Source,
    pub cached_at: DateTime<Utc>,
}
