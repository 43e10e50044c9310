//! # Structured Logging Module
//!
//! Environment-aware structured logging for the resolution engine. Console
//! output is human-readable by default and switches to JSON when
//! `LOG_FORMAT=json` is set.

use crate::constants::env as env_vars;
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));
        let json = std::env::var(env_vars::LOG_FORMAT)
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let layer = if json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        // A global subscriber may already be installed by the embedding service
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %environment,
            json = json,
            "Structured logging initialized"
        );
    });
}

/// Get current environment from environment variables
pub(crate) fn get_environment() -> String {
    std::env::var(env_vars::RESOLVER_ENV)
        .or_else(|_| std::env::var(env_vars::APP_ENV))
        .unwrap_or_else(|_| env_vars::DEFAULT_ENVIRONMENT.to_string())
        .to_lowercase()
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log the terminal outcome of one resolution
pub fn log_resolution_outcome(
    content_key: &str,
    outcome: &str,
    source: Option<&str>,
    attempted: usize,
    failures: usize,
    stale: bool,
) {
    tracing::info!(
        content_key = %content_key,
        outcome = %outcome,
        source = source,
        attempted = attempted,
        failures = failures,
        stale = stale,
        timestamp = %Utc::now().to_rfc3339(),
        "RESOLUTION"
    );
}

/// Log a cache operation against the key/value collaborator
pub fn log_cache_operation(operation: &str, key: &str, status: &str, details: Option<&str>) {
    tracing::debug!(
        operation = %operation,
        key = %key,
        status = %status,
        details = details,
        "CACHE_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
