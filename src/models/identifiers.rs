//! Normalized identifiers.
//!
//! Both identifiers are trimmed and lowercased on construction so that
//! `"NG"`, `" ng "` and `"ng"` name the same back-end. Content keys also have
//! the cache key separator `:` and the wildcard `*` replaced by `-`, so a slug
//! can never widen an invalidation pattern built from another slug.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque lowercase code identifying a regional back-end
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Source(String);

impl Source {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for Source {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Source::new)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Source {
    fn from(code: &str) -> Self {
        Source::new(code)
    }
}

impl AsRef<str> for Source {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalized slug of a requested item within a source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContentKey(String);

impl ContentKey {
    pub fn new(slug: impl AsRef<str>) -> Self {
        let slug = slug.as_ref().trim().to_lowercase();
        Self(slug.replace([':', '*'], "-"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for ContentKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(ContentKey::new)
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentKey {
    fn from(slug: &str) -> Self {
        ContentKey::new(slug)
    }
}
