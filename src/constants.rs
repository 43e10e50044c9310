//! # System Constants
//!
//! Fixed tokens, defaults and environment variable names shared across the
//! resolution engine.

/// Cache key layout
pub mod cache {
    /// Default namespace segment of every article cache key
    pub const DEFAULT_KEY_PREFIX: &str = "article";
    /// Version segment used for the always-overwritten pointer key
    pub const LATEST_TOKEN: &str = "latest";
    /// Default time-to-live for cached payloads
    pub const DEFAULT_TTL_SECONDS: u64 = 3600;
    /// Default moka capacity (entries)
    pub const DEFAULT_MAX_CAPACITY: u64 = 10_000;
    /// Default cache backend name
    pub const DEFAULT_BACKEND: &str = "moka";
}

/// Feature toggles understood by the source registry
pub mod features {
    /// When enabled, the global alias source closes every priority list
    pub const GLOBAL_FALLBACK: &str = "global_fallback";
}

/// Cache write scheduler defaults
pub mod scheduler {
    pub const DEFAULT_MAX_CONCURRENT_WRITES: usize = 16;
}

/// Environment variables consulted at startup
pub mod env {
    /// Primary environment selector
    pub const RESOLVER_ENV: &str = "RESOLVER_ENV";
    /// Secondary environment selector
    pub const APP_ENV: &str = "APP_ENV";
    /// Prefix for configuration overrides (`RESOLVER__CACHE__TTL_SECONDS=60`)
    pub const CONFIG_PREFIX: &str = "RESOLVER";
    /// `json` switches log output to the JSON formatter
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
    pub const DEFAULT_ENVIRONMENT: &str = "development";
}
