//! # Resolver Configuration
//!
//! Declares which regional back-ends exist, which of them have an endpoint,
//! how editions alias onto sources, and how the cache and write scheduler are
//! sized.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use edition_resolver::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let ttl = manager.config().cache.ttl();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::{cache as cache_defaults, features, scheduler as scheduler_defaults};
use crate::resilience::CircuitBreakerConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Role a source plays when priority lists are built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A country edition back-end
    Country,
    /// The default site
    Site,
    /// The catch-all global edition
    Global,
}

/// One regional back-end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub code: String,
    #[serde(default = "default_source_kind")]
    pub kind: SourceKind,
    /// Base URL of the back-end; a source without one is never queried
    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_source_kind() -> SourceKind {
    SourceKind::Country
}

impl SourceConfig {
    pub fn country(code: &str, endpoint: Option<&str>) -> Self {
        Self {
            code: code.to_string(),
            kind: SourceKind::Country,
            endpoint: endpoint.map(str::to_string),
        }
    }

    /// Whether an endpoint is configured (blank strings do not count)
    pub fn is_configured(&self) -> bool {
        self.endpoint
            .as_deref()
            .map(|endpoint| !endpoint.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Cache collaborator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub backend: String,
    pub key_prefix: String,
    pub ttl_seconds: u64,
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: cache_defaults::DEFAULT_BACKEND.to_string(),
            key_prefix: cache_defaults::DEFAULT_KEY_PREFIX.to_string(),
            ttl_seconds: cache_defaults::DEFAULT_TTL_SECONDS,
            max_capacity: cache_defaults::DEFAULT_MAX_CAPACITY,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Cache write scheduler settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub max_concurrent_writes: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_writes: scheduler_defaults::DEFAULT_MAX_CONCURRENT_WRITES,
        }
    }
}

/// Per-source circuit breaker settings as they appear in configuration files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerSettings {
    pub failure_threshold: u32,
    pub timeout_seconds: u64,
    pub success_threshold: u32,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            timeout_seconds: 30,
            success_threshold: 2,
        }
    }
}

impl CircuitBreakerSettings {
    pub fn to_resilience_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            timeout: Duration::from_secs(self.timeout_seconds),
            success_threshold: self.success_threshold,
        }
    }
}

/// Root configuration structure mirroring `resolver.yaml`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Back-ends in priority order (country order matters)
    pub sources: Vec<SourceConfig>,
    /// Source tried right after the primary edition
    pub default_site: Option<String>,
    /// Catch-all source closing every priority list
    pub global_alias: Option<String>,
    /// Edition alias -> representative source
    pub aliases: BTreeMap<String, String>,
    /// Feature toggles; part of the priority signature
    pub features: BTreeMap<String, bool>,
    pub cache: CacheConfig,
    pub scheduler: SchedulerConfig,
    pub circuit_breaker: Option<CircuitBreakerSettings>,
}

impl ResolverConfig {
    /// Whether a feature toggle is on. `global_fallback` defaults to on.
    pub fn feature_enabled(&self, name: &str) -> bool {
        match self.features.get(name) {
            Some(enabled) => *enabled,
            None => name == features::GLOBAL_FALLBACK,
        }
    }

    /// Validate cross-field constraints after loading
    pub fn validate(&self) -> ConfigResult<()> {
        let mut seen = HashSet::new();
        for source in &self.sources {
            let code = source.code.trim().to_lowercase();
            if code.is_empty() {
                return Err(ConfigurationError::missing_required_field(
                    "code",
                    "sources entry",
                ));
            }
            if !seen.insert(code.clone()) {
                return Err(ConfigurationError::invalid_value(
                    "sources.code",
                    code,
                    "source codes must be unique",
                ));
            }
        }

        let declared = |code: &str| seen.contains(&code.trim().to_lowercase());

        for (alias, target) in &self.aliases {
            if !declared(target) {
                return Err(ConfigurationError::invalid_value(
                    format!("aliases.{alias}"),
                    target.clone(),
                    "alias must point at a declared source",
                ));
            }
        }

        for (field, value) in [
            ("default_site", &self.default_site),
            ("global_alias", &self.global_alias),
        ] {
            if let Some(code) = value {
                if !declared(code) {
                    return Err(ConfigurationError::invalid_value(
                        field,
                        code.clone(),
                        "must name a declared source",
                    ));
                }
            }
        }

        if self.cache.ttl_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "cache.ttl_seconds",
                "0",
                "ttl must be greater than 0",
            ));
        }

        if self.cache.key_prefix.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "key_prefix",
                "cache",
            ));
        }

        if self.scheduler.max_concurrent_writes == 0 {
            return Err(ConfigurationError::invalid_value(
                "scheduler.max_concurrent_writes",
                "0",
                "at least one concurrent write is required",
            ));
        }

        if let Some(cb) = &self.circuit_breaker {
            cb.to_resilience_config()
                .validate()
                .map_err(|reason| {
                    ConfigurationError::invalid_value(
                        "circuit_breaker",
                        format!("{cb:?}"),
                        reason,
                    )
                })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResolverConfig {
        ResolverConfig {
            sources: vec![
                SourceConfig::country("ng", Some("https://ng.example.com")),
                SourceConfig::country("za", Some("https://za.example.com")),
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

    #[test]
    fn test_valid_config_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_duplicate_source_codes_rejected() {
        let mut config = sample();
        config.sources.push(SourceConfig::country("NG", None));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unique"));
    }

    #[test]
    fn test_alias_must_target_declared_source() {
        let mut config = sample();
        config
            .aliases
            .insert("europe".to_string(), "uk".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = sample();
        config.cache.ttl_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_circuit_breaker_rejected() {
        let mut config = sample();
        config.circuit_breaker = Some(CircuitBreakerSettings {
            failure_threshold: 0,
            ..CircuitBreakerSettings::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_endpoint_is_not_configured() {
        let source = SourceConfig::country("ke", Some("   "));
        assert!(!source.is_configured());
        assert!(!SourceConfig::country("ke", None).is_configured());
        assert!(SourceConfig::country("ke", Some("https://ke.example.com")).is_configured());
    }

    #[test]
    fn test_global_fallback_defaults_on() {
        let mut config = sample();
        assert!(config.feature_enabled(features::GLOBAL_FALLBACK));
        assert!(!config.feature_enabled("beta_editions"));
        config
            .features
            .insert(features::GLOBAL_FALLBACK.to_string(), false);
        assert!(!config.feature_enabled(features::GLOBAL_FALLBACK));
    }
}
