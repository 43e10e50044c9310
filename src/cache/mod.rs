//! # Article Cache
//!
//! Key/value caching for resolved articles.
//!
//! ## Architecture
//!
//! ```text
//! ArticleCache                   <- typed CachedPayload reads/writes, stale lookup
//!   └── Arc<dyn CacheService>
//!         └── CacheProvider (enum)
//!               ├── Moka(MokaCacheService)  <- in-process, cache-level TTL
//!               └── NoOp(NoOpCacheService)  <- always-miss fallback
//! ```
//!
//! - **Graceful degradation**: an unknown or disabled backend becomes NoOp, startup never fails
//! - **Best-effort I/O**: read and write errors are logged and folded into misses/reports
//! - **Two keys per write**: a version-pinned key plus an always-overwritten `latest` pointer

pub mod article_cache;
pub mod codec;
pub mod errors;
pub mod provider;
pub mod providers;
pub mod traits;

pub use article_cache::{ArticleCache, WriteReport};
pub use codec::{content_tags, derive_version, sanitize_version, KeyCodec};
pub use errors::{CacheError, CacheResult};
pub use provider::CacheProvider;
pub use providers::{MokaCacheService, NoOpCacheService};
pub use traits::CacheService;
