//! Configuration Loader
//!
//! Environment-aware configuration loading. Sources are layered with the
//! `config` crate in increasing precedence:
//!
//! 1. `resolver.yaml` (required)
//! 2. `resolver.<environment>.yaml` (optional overlay)
//! 3. `RESOLVER__*` environment variables (`RESOLVER__CACHE__TTL_SECONDS=60`)

use super::error::{ConfigResult, ConfigurationError};
use super::ResolverConfig;
use crate::constants::env as env_vars;
use config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const BASE_FILE_NAMES: [&str; 2] = ["resolver.yaml", "resolver.yml"];

/// Loaded, validated configuration plus where it came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: ResolverConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = crate::logging::get_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    /// This is useful for testing without modifying global environment variables
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(|| PathBuf::from("config"));

        debug!(
            environment = environment,
            directory = %config_directory.display(),
            "Loading resolver configuration"
        );

        let base_file = Self::find_config_file(&config_directory)?;
        let overlay_file = config_directory.join(format!("resolver.{environment}.yaml"));

        let layered = Config::builder()
            .add_source(File::from(base_file.clone()).format(FileFormat::Yaml))
            .add_source(
                File::from(overlay_file)
                    .format(FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(env_vars::CONFIG_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigurationError::load_error(base_file.display().to_string(), e))?;

        let config: ResolverConfig = layered
            .try_deserialize()
            .map_err(ConfigurationError::deserialize_error)?;

        let manager = Self::from_config(config, environment, config_directory)?;

        info!(
            environment = environment,
            sources = manager.config.sources.len(),
            cache_backend = %manager.config.cache.backend,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(manager))
    }

    /// Wrap an already-built configuration, validating it first
    pub fn from_config(
        config: ResolverConfig,
        environment: &str,
        config_directory: PathBuf,
    ) -> ConfigResult<Self> {
        config.validate()?;

        debug!(
            "Resolver configuration: {}",
            serde_json::to_string(&Self::sanitize_config_for_logging(&config))
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );

        Ok(Self {
            config,
            environment: environment.to_string(),
            config_directory,
        })
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Get the current environment
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Get the configuration directory
    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Configuration as JSON with endpoint credentials masked
    pub fn debug_config(&self) -> serde_json::Value {
        Self::sanitize_config_for_logging(&self.config)
    }

    fn find_config_file(config_directory: &Path) -> ConfigResult<PathBuf> {
        let mut searched_paths = Vec::new();

        for name in BASE_FILE_NAMES {
            let config_path = config_directory.join(name);
            searched_paths.push(config_path.clone());

            if config_path.is_file() {
                debug!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        Err(ConfigurationError::config_file_not_found(searched_paths))
    }

    fn sanitize_config_for_logging(config: &ResolverConfig) -> serde_json::Value {
        let mut sanitized = config.clone();
        for source in &mut sanitized.sources {
            if let Some(endpoint) = source.endpoint.as_mut() {
                *endpoint = mask_userinfo(endpoint);
            }
        }
        serde_json::json!(sanitized)
    }
}

/// Mask `user:password@` in an endpoint URL
fn mask_userinfo(endpoint: &str) -> String {
    let Some((scheme, rest)) = endpoint.split_once("://") else {
        return endpoint.to_string();
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{scheme}://[MASKED]@{}", &rest[at + 1..]),
        None => endpoint.to_string(),
    }
}
