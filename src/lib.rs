#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Edition Resolver
//!
//! Article resolution and fallback caching for a multi-edition news site.
//!
//! ## Overview
//!
//! Every edition (country) is served by its own content back-end, and any of
//! them may be down at any moment. Given an edition and an article slug, the
//! engine decides which back-ends to ask and in what order. It caches
//! successful answers and, when every back-end is failing, serves the most
//! recent known-good copy instead of an error.
//!
//! ## Module Organization
//!
//! - [`sources`] - Source registry, memoized priority lists, source client contract
//! - [`resolver`] - Fallback state machine and resolution outcomes
//! - [`cache`] - Cache backends, key/version codec, typed article cache
//! - [`scheduler`] - Bounded fire-and-forget cache writes
//! - [`resilience`] - Per-source circuit breakers
//! - [`config`] - Layered YAML/environment configuration
//! - [`logging`] - Structured logging setup
//! - [`error`] - Error taxonomy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use edition_resolver::config::ConfigManager;
//! use edition_resolver::error::SourceError;
//! use edition_resolver::models::{ContentKey, Source};
//! use edition_resolver::resolver::{ArticleResolver, Resolution};
//! use edition_resolver::sources::{FetchOutcome, SourceClient};
//! use std::sync::Arc;
//!
//! struct HttpClient;
//!
//! #[async_trait]
//! impl SourceClient for HttpClient {
//!     async fn fetch(
//!         &self,
//!         _source: &Source,
//!         _content_key: &ContentKey,
//!         _preview: bool,
//!     ) -> Result<FetchOutcome, SourceError> {
//!         Ok(FetchOutcome::NotFound)
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! edition_resolver::logging::init_structured_logging();
//! let manager = ConfigManager::load()?;
//! let resolver = ArticleResolver::from_config(manager.config(), Arc::new(HttpClient))?;
//!
//! match resolver.resolve("ng", "budget-speech", false).await {
//!     Resolution::Found(found) => println!("served from {}", found.source_country),
//!     Resolution::NotFound => println!("404"),
//!     Resolution::TemporaryError(failure) => {
//!         println!("unavailable, stale copy: {}", failure.stale().is_some())
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod resilience;
pub mod resolver;
pub mod scheduler;
pub mod sources;

pub use config::{ConfigManager, ResolverConfig};
pub use error::{FailureKind, ResolverError, Result, SourceError};
pub use models::{Article, CachedPayload, ContentKey, ResolvedItem, Source};
pub use resolver::{ArticleResolver, Resolution};
pub use scheduler::WriteScheduler;
pub use sources::{FetchOutcome, PriorityBuilder, PriorityCache, PriorityList, SourceClient};
