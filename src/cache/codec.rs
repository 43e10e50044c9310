//! Cache key and version codec.
//!
//! Keys have the shape `<prefix>:<source>:<content_key>:<version>` where the
//! version segment is either a sanitized identity of the article revision or
//! the `latest` pointer token.

use crate::constants::cache::{DEFAULT_KEY_PREFIX, LATEST_TOKEN};
use crate::models::{Article, ContentKey, Source};
use std::collections::BTreeSet;

/// Derive the version segment for an article.
///
/// Preference order: last-modified timestamp, publish timestamp, numeric id,
/// then the `latest` token. Blank timestamps are skipped.
pub fn derive_version(article: &Article) -> String {
    let raw = [article.modified.as_deref(), article.published.as_deref()]
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .map(str::to_string)
        .or_else(|| article.id.map(|id| id.to_string()));

    match raw {
        Some(raw) => sanitize_version(&raw),
        None => LATEST_TOKEN.to_string(),
    }
}

/// Restrict a raw version to `[a-z0-9_-]`.
///
/// Input is lowercased, every run of disallowed characters becomes a single
/// `-`, and leading/trailing dashes are dropped. An empty result yields the
/// `latest` token.
pub fn sanitize_version(raw: &str) -> String {
    let mut sanitized = String::with_capacity(raw.len());
    let mut in_disallowed_run = false;

    for ch in raw.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-' {
            sanitized.push(ch);
            in_disallowed_run = false;
        } else if !in_disallowed_run {
            sanitized.push('-');
            in_disallowed_run = true;
        }
    }

    let trimmed = sanitized.trim_matches('-');
    if trimmed.is_empty() {
        LATEST_TOKEN.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Invalidation labels for one article.
///
/// Always carries the slug tag; carries the id tag when the back-end exposed a
/// numeric id. External invalidation (a content-change webhook) can target
/// either without knowing cache keys.
pub fn content_tags(source: &Source, content_key: &ContentKey, id: Option<u64>) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    tags.insert(format!("article:{source}:slug:{content_key}"));
    if let Some(id) = id {
        tags.insert(format!("article:{source}:id:{id}"));
    }
    tags
}

/// Builds cache keys under a fixed prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCodec {
    prefix: String,
}

impl Default for KeyCodec {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

impl KeyCodec {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `None` or an empty version addresses the `latest` pointer.
    pub fn build_key(&self, source: &Source, content_key: &ContentKey, version: Option<&str>) -> String {
        let version = version
            .filter(|version| !version.is_empty())
            .unwrap_or(LATEST_TOKEN);
        format!("{}:{source}:{content_key}:{version}", self.prefix)
    }

    pub fn latest_key(&self, source: &Source, content_key: &ContentKey) -> String {
        self.build_key(source, content_key, None)
    }

    /// Pattern matching every version of one article, `latest` included
    pub fn article_pattern(&self, source: &Source, content_key: &ContentKey) -> String {
        format!("{}:{source}:{content_key}:*", self.prefix)
    }
}
