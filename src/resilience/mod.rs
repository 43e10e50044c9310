//! # Resilience Module
//!
//! Circuit breakers that isolate failing regional back-ends so a source that is
//! known to be down fails fast instead of costing a full timeout on every
//! request.
//!
//! ## Usage
//!
//! ```rust
//! use edition_resolver::resilience::{CircuitBreaker, CircuitBreakerConfig};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CircuitBreakerConfig {
//!     failure_threshold: 5,
//!     timeout: Duration::from_secs(30),
//!     success_threshold: 2,
//! };
//!
//! let circuit_breaker = CircuitBreaker::new("source:ng".to_string(), config);
//!
//! let result = circuit_breaker
//!     .call(|| async { Ok::<&str, String>("article body") })
//!     .await;
//! assert!(result.is_ok());
//! # Ok(())
//! # }
//! ```

pub mod circuit_breaker;
pub mod config;
pub mod metrics;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerError, CircuitState};
pub use config::CircuitBreakerConfig;
pub use metrics::CircuitBreakerMetrics;
