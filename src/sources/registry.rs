//! Source registry and configuration signature.

use crate::config::{ResolverConfig, SourceKind};
use crate::constants::features;
use crate::models::Source;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// SHA-256 over everything that shapes a priority list.
///
/// Two registries with the same signature produce identical lists for every
/// primary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
struct RegisteredSource {
    source: Source,
    kind: SourceKind,
    endpoint: Option<String>,
}

impl RegisteredSource {
    fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }
}

/// Static lookup over the configured back-ends
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<RegisteredSource>,
    index: HashMap<Source, usize>,
    default_site: Option<Source>,
    global_alias: Option<Source>,
    aliases: HashMap<Source, Source>,
    features: BTreeMap<String, bool>,
    signature: Signature,
}

impl SourceRegistry {
    /// Build from configuration.
    ///
    /// Without an explicit `default_site`/`global_alias` the first source of
    /// kind `site`/`global` fills the role.
    pub fn from_config(config: &ResolverConfig) -> Self {
        let sources: Vec<RegisteredSource> = config
            .sources
            .iter()
            .map(|entry| RegisteredSource {
                source: Source::new(&entry.code),
                kind: entry.kind,
                endpoint: entry
                    .is_configured()
                    .then(|| entry.endpoint.clone())
                    .flatten(),
            })
            .collect();

        let first_of_kind = |kind: SourceKind| {
            sources
                .iter()
                .find(|entry| entry.kind == kind)
                .map(|entry| entry.source.clone())
        };

        let default_site = config
            .default_site
            .as_deref()
            .map(Source::new)
            .or_else(|| first_of_kind(SourceKind::Site));
        let global_alias = config
            .global_alias
            .as_deref()
            .map(Source::new)
            .or_else(|| first_of_kind(SourceKind::Global));

        let mut toggles = config.features.clone();
        toggles
            .entry(features::GLOBAL_FALLBACK.to_string())
            .or_insert_with(|| config.feature_enabled(features::GLOBAL_FALLBACK));

        let aliases = config
            .aliases
            .iter()
            .map(|(alias, target)| (Source::new(alias), Source::new(target)))
            .collect();

        let index = sources
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.source.clone(), position))
            .collect();

        let mut registry = Self {
            sources,
            index,
            default_site,
            global_alias,
            aliases,
            features: toggles,
            signature: Signature(String::new()),
        };
        registry.signature = registry.compute_signature();
        registry
    }

    fn compute_signature(&self) -> Signature {
        let mut configured: Vec<&str> = self
            .sources
            .iter()
            .filter(|entry| entry.is_configured())
            .map(|entry| entry.source.as_str())
            .collect();
        configured.sort_unstable();

        let mut hasher = Sha256::new();
        for code in configured {
            hasher.update(format!("configured:{code}\n"));
        }
        for entry in self.sources.iter().filter(|entry| entry.kind == SourceKind::Country) {
            hasher.update(format!("country:{}\n", entry.source));
        }
        for (name, enabled) in &self.features {
            hasher.update(format!("feature:{name}={enabled}\n"));
        }
        if let Some(site) = &self.default_site {
            hasher.update(format!("default_site:{site}\n"));
        }
        if let Some(global) = &self.global_alias {
            hasher.update(format!("global_alias:{global}\n"));
        }

        Signature(hex::encode(hasher.finalize()))
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Whether `source` is declared and has an endpoint
    pub fn is_configured(&self, source: &Source) -> bool {
        self.index
            .get(source)
            .map(|&position| self.sources[position].is_configured())
            .unwrap_or(false)
    }

    pub fn endpoint(&self, source: &Source) -> Option<&str> {
        self.index
            .get(source)
            .and_then(|&position| self.sources[position].endpoint.as_deref())
    }

    pub fn contains(&self, source: &Source) -> bool {
        self.index.contains_key(source)
    }

    /// Every declared source in configured order
    pub fn sources(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter().map(|entry| &entry.source)
    }

    /// Country-kind sources in configured order, configured or not
    pub fn country_sources(&self) -> impl Iterator<Item = &Source> {
        self.sources
            .iter()
            .filter(|entry| entry.kind == SourceKind::Country)
            .map(|entry| &entry.source)
    }

    pub fn default_site(&self) -> Option<&Source> {
        self.default_site.as_ref()
    }

    /// The global catch-all, unless the `global_fallback` toggle is off
    pub fn global_alias(&self) -> Option<&Source> {
        if self.feature_enabled(features::GLOBAL_FALLBACK) {
            self.global_alias.as_ref()
        } else {
            None
        }
    }

    /// Map an edition onto the source that represents it
    pub fn resolve_alias(&self, edition: &str) -> Source {
        let edition = Source::new(edition);
        self.aliases.get(&edition).cloned().unwrap_or(edition)
    }

    pub fn feature_enabled(&self, name: &str) -> bool {
        self.features.get(name).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceConfig;

    fn config() -> ResolverConfig {
        ResolverConfig {
            sources: vec![
                SourceConfig::country("ng", Some("https://ng.example.com")),
                SourceConfig::country("za", Some("https://za.example.com")),
                SourceConfig::country("ke", None),
                SourceConfig {
                    code: "site".to_string(),
                    kind: SourceKind::Site,
                    endpoint: Some("https://example.com".to_string()),
                },
                SourceConfig {
                    code: "global".to_string(),
                    kind: SourceKind::Global,
                    endpoint: Some("https://www.example.com".to_string()),
                },
            ],
            aliases: BTreeMap::from([("africa".to_string(), "ng".to_string())]),
            ..ResolverConfig::default()
        }
    }

    #[test]
    fn test_configured_lookup() {
        let registry = SourceRegistry::from_config(&config());
        assert!(registry.is_configured(&Source::new("ng")));
        assert!(!registry.is_configured(&Source::new("ke")));
        assert!(!registry.is_configured(&Source::new("uk")));
        assert!(registry.contains(&Source::new("ke")));
        assert_eq!(registry.endpoint(&Source::new("za")), Some("https://za.example.com"));
    }

    #[test]
    fn test_roles_default_to_first_of_kind() {
        let registry = SourceRegistry::from_config(&config());
        assert_eq!(registry.default_site(), Some(&Source::new("site")));
        assert_eq!(registry.global_alias(), Some(&Source::new("global")));
        let countries: Vec<_> = registry.country_sources().map(Source::as_str).collect();
        assert_eq!(countries, vec!["ng", "za", "ke"]);
    }

    #[test]
    fn test_alias_resolution() {
        let registry = SourceRegistry::from_config(&config());
        assert_eq!(registry.resolve_alias("Africa"), Source::new("ng"));
        assert_eq!(registry.resolve_alias("za"), Source::new("za"));
    }

    #[test]
    fn test_global_fallback_toggle_hides_global() {
        let mut cfg = config();
        cfg.features
            .insert(features::GLOBAL_FALLBACK.to_string(), false);
        let registry = SourceRegistry::from_config(&cfg);
        assert_eq!(registry.global_alias(), None);
    }

    #[test]
    fn test_signature_is_stable_and_sensitive() {
        let a = SourceRegistry::from_config(&config());
        let b = SourceRegistry::from_config(&config());
        assert_eq!(a.signature(), b.signature());
        assert_eq!(a.signature().as_str().len(), 64);

        let mut toggled = config();
        toggled
            .features
            .insert(features::GLOBAL_FALLBACK.to_string(), false);
        assert_ne!(a.signature(), SourceRegistry::from_config(&toggled).signature());

        let mut configured = config();
        configured.sources[2].endpoint = Some("https://ke.example.com".to_string());
        assert_ne!(a.signature(), SourceRegistry::from_config(&configured).signature());
    }

    #[test]
    fn test_explicit_default_feature_matches_implicit() {
        let mut explicit = config();
        explicit
            .features
            .insert(features::GLOBAL_FALLBACK.to_string(), true);
        assert_eq!(
            SourceRegistry::from_config(&config()).signature(),
            SourceRegistry::from_config(&explicit).signature()
        );
    }
}
