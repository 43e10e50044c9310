//! Priority list construction and memoization.
//!
//! A list for primary `p` is `[p, default_site, countries.., global]`,
//! restricted to configured sources, first occurrence wins. Lists are cached
//! per resolved primary and reused only while the registry signature they were
//! built under is still current.

use super::registry::{Signature, SourceRegistry};
use crate::models::Source;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Ordered, duplicate-free candidate sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityList {
    primary: Option<Source>,
    sources: Vec<Source>,
    /// `None` for caller-supplied lists
    signature: Option<Signature>,
}

impl PriorityList {
    fn built(primary: Source, candidates: impl IntoIterator<Item = Source>, signature: Signature) -> Self {
        Self {
            primary: Some(primary),
            sources: dedup(candidates),
            signature: Some(signature),
        }
    }

    /// A caller-supplied order; duplicates are dropped, nothing is filtered.
    pub fn explicit(sources: impl IntoIterator<Item = Source>) -> Self {
        let sources = dedup(sources);
        Self {
            primary: sources.first().cloned(),
            sources,
            signature: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            primary: None,
            sources: Vec::new(),
            signature: None,
        }
    }

    /// The edition the list was built for, after alias resolution
    pub fn primary(&self) -> Option<&Source> {
        self.primary.as_ref()
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn as_slice(&self) -> &[Source] {
        &self.sources
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Source> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn contains(&self, source: &Source) -> bool {
        self.sources.contains(source)
    }
}

impl<'a> IntoIterator for &'a PriorityList {
    type Item = &'a Source;
    type IntoIter = std::slice::Iter<'a, Source>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn dedup(candidates: impl IntoIterator<Item = Source>) -> Vec<Source> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|source| !source.is_empty() && seen.insert(source.clone()))
        .collect()
}

/// Memoized priority lists keyed by resolved primary.
///
/// One instance lives for the process (shared through `Arc`); `clear` resets
/// it. Entries are immutable once stored and are only inserted or replaced
/// whole, so concurrent readers never observe a partially built list.
#[derive(Debug, Default)]
pub struct PriorityCache {
    entries: DashMap<Source, Arc<PriorityList>>,
}

impl PriorityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, primary: &Source) -> Option<Arc<PriorityList>> {
        self.entries.get(primary).map(|entry| Arc::clone(entry.value()))
    }

    pub fn put(&self, primary: Source, list: Arc<PriorityList>) {
        self.entries.insert(primary, list);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug)]
pub struct PriorityBuilder {
    registry: RwLock<Arc<SourceRegistry>>,
    cache: Arc<PriorityCache>,
}

impl PriorityBuilder {
    pub fn new(registry: Arc<SourceRegistry>, cache: Arc<PriorityCache>) -> Self {
        Self {
            registry: RwLock::new(registry),
            cache,
        }
    }

    /// Current registry snapshot
    pub fn registry(&self) -> Arc<SourceRegistry> {
        Arc::clone(&self.registry.read())
    }

    pub fn cache(&self) -> &Arc<PriorityCache> {
        &self.cache
    }

    /// Swap in a new registry. Cached lists built under a different signature
    /// are recomputed lazily on next use.
    pub fn reload(&self, registry: Arc<SourceRegistry>) {
        let previous = std::mem::replace(&mut *self.registry.write(), registry);
        debug!(
            previous_signature = %previous.signature(),
            signature = %self.registry.read().signature(),
            "Source registry reloaded"
        );
    }

    /// Ordered candidate sources for `primary` (an edition code or alias).
    ///
    /// A blank primary yields an empty list.
    pub fn build_priority(&self, primary: &str) -> Arc<PriorityList> {
        let registry = self.registry();
        let primary = registry.resolve_alias(primary);
        if primary.is_empty() {
            return Arc::new(PriorityList::empty());
        }

        let signature = registry.signature();
        if let Some(cached) = self.cache.get(&primary) {
            if cached.signature() == Some(signature) {
                return cached;
            }
            debug!(primary = %primary, "Priority list signature changed, recomputing");
        }

        let candidates = std::iter::once(primary.clone())
            .chain(registry.default_site().cloned())
            .chain(registry.country_sources().cloned())
            .chain(registry.global_alias().cloned())
            .filter(|source| registry.is_configured(source))
            .collect::<Vec<_>>();

        let list = Arc::new(PriorityList::built(
            primary.clone(),
            candidates,
            signature.clone(),
        ));

        debug!(
            primary = %primary,
            sources = ?list.as_slice(),
            "Priority list built"
        );

        self.cache.put(primary, Arc::clone(&list));
        list
    }
}
