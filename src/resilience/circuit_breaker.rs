//! # Circuit Breaker Implementation
//!
//! Three-state breaker: Closed (normal operation), Open (failing fast) and
//! Half-Open (testing recovery). State and counters are atomics so the hot
//! path never takes a lock.

use crate::resilience::{CircuitBreakerConfig, CircuitBreakerMetrics};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct AtomicCounters {
    total_calls: AtomicU64,
    success_count: AtomicU64,
    failure_count: AtomicU64,
    consecutive_failures: AtomicU64,
    half_open_calls: AtomicU64,
    total_duration_nanos: AtomicU64,
}

impl AtomicCounters {
    fn record(&self, success: bool, duration: Duration) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        if success {
            self.success_count.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failure_count.fetch_add(1, Ordering::Relaxed);
        }
        self.total_duration_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    fn snapshot(&self, state: CircuitState) -> CircuitBreakerMetrics {
        let total_calls = self.total_calls.load(Ordering::Relaxed);
        let success_count = self.success_count.load(Ordering::Relaxed);
        let failure_count = self.failure_count.load(Ordering::Relaxed);
        let total_duration_nanos = self.total_duration_nanos.load(Ordering::Relaxed);

        let mut metrics = CircuitBreakerMetrics {
            total_calls,
            success_count,
            failure_count,
            consecutive_failures: self.consecutive_failures.load(Ordering::Relaxed),
            half_open_calls: self.half_open_calls.load(Ordering::Relaxed),
            total_duration: Duration::from_nanos(total_duration_nanos),
            current_state: state,
            ..CircuitBreakerMetrics::default()
        };

        if total_calls > 0 {
            metrics.failure_rate = failure_count as f64 / total_calls as f64;
            metrics.success_rate = success_count as f64 / total_calls as f64;
            if success_count > 0 {
                metrics.average_duration = Duration::from_nanos(total_duration_nanos / success_count);
            }
        }

        metrics
    }
}

#[inline]
fn epoch_nanos_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_nanos() as u64
}

/// Circuit breaker states representing the current operational mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CircuitState {
    /// Normal operation - all calls are allowed through
    Closed = 0,
    /// Failure mode - all calls fail fast without executing
    Open = 1,
    /// Testing recovery - limited calls allowed to test system health
    HalfOpen = 2,
}

impl From<u8> for CircuitState {
    fn from(value: u8) -> Self {
        match value {
            0 => CircuitState::Closed,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Open,
        }
    }
}

/// Errors that can occur during circuit breaker operation
#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    /// Circuit is open, rejecting all calls
    #[error("Circuit breaker is open for {component}")]
    CircuitOpen { component: String },

    /// Operation failed and was recorded
    #[error("Operation failed: {0}")]
    OperationFailed(E),
}

/// Core circuit breaker implementation with atomic state management
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Component name for logging and metrics
    name: String,
    state: AtomicU8,
    config: CircuitBreakerConfig,
    counters: AtomicCounters,
    /// Epoch nanos when circuit was opened (0 = not open)
    opened_at_epoch_nanos: AtomicU64,
}

impl CircuitBreaker {
    pub fn new(name: String, config: CircuitBreakerConfig) -> Self {
        debug!(
            component = %name,
            failure_threshold = config.failure_threshold,
            timeout_seconds = config.timeout.as_secs(),
            success_threshold = config.success_threshold,
            "Circuit breaker initialized"
        );

        Self {
            name,
            state: AtomicU8::new(CircuitState::Closed as u8),
            config,
            counters: AtomicCounters::default(),
            opened_at_epoch_nanos: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> CircuitState {
        CircuitState::from(self.state.load(Ordering::Acquire))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute an operation with circuit breaker protection
    pub async fn call<F, T, E, Fut>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.should_allow() {
            return Err(CircuitBreakerError::CircuitOpen {
                component: self.name.clone(),
            });
        }

        let start = Instant::now();
        let result = operation().await;
        match &result {
            Ok(_) => self.record_success_manual(start.elapsed()),
            Err(_) => self.record_failure_manual(start.elapsed()),
        }

        result.map_err(CircuitBreakerError::OperationFailed)
    }

    /// Pre-flight check for callers that record outcomes manually.
    ///
    /// An open circuit whose timeout has elapsed moves to half-open here.
    pub fn should_allow(&self) -> bool {
        match self.state() {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let opened_nanos = self.opened_at_epoch_nanos.load(Ordering::Acquire);
                if opened_nanos == 0 {
                    warn!(component = %self.name, "Circuit open but no timestamp recorded");
                    return true;
                }

                let elapsed_nanos = epoch_nanos_now().saturating_sub(opened_nanos);
                if elapsed_nanos >= self.config.timeout.as_nanos() as u64 {
                    self.transition_to_half_open();
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                self.counters.half_open_calls.load(Ordering::Relaxed)
                    < self.config.success_threshold as u64
            }
        }
    }

    pub fn record_success_manual(&self, duration: Duration) {
        self.counters.record(true, duration);

        match self.state() {
            CircuitState::HalfOpen => {
                let calls = self.counters.half_open_calls.fetch_add(1, Ordering::Relaxed) + 1;
                if calls >= self.config.success_threshold as u64 {
                    self.transition_to_closed();
                }
            }
            CircuitState::Closed => {
                self.counters.consecutive_failures.store(0, Ordering::Relaxed);
            }
            CircuitState::Open => {
                warn!(component = %self.name, "Success recorded while circuit is open");
            }
        }
    }

    pub fn record_failure_manual(&self, duration: Duration) {
        self.counters.record(false, duration);

        match self.state() {
            CircuitState::Closed => {
                let failures = self
                    .counters
                    .consecutive_failures
                    .fetch_add(1, Ordering::Relaxed)
                    + 1;
                if failures >= self.config.failure_threshold as u64 {
                    self.transition_to_open();
                }
            }
            // Any failure while probing reopens immediately
            CircuitState::HalfOpen => self.transition_to_open(),
            CircuitState::Open => {}
        }
    }

    fn transition_to_closed(&self) {
        self.counters.consecutive_failures.store(0, Ordering::Relaxed);
        self.counters.half_open_calls.store(0, Ordering::Relaxed);
        self.opened_at_epoch_nanos.store(0, Ordering::Release);
        self.state
            .store(CircuitState::Closed as u8, Ordering::Release);

        info!(component = %self.name, "Circuit breaker closed (recovered)");
    }

    fn transition_to_open(&self) {
        self.opened_at_epoch_nanos
            .store(epoch_nanos_now(), Ordering::Release);
        self.counters.half_open_calls.store(0, Ordering::Relaxed);
        self.state.store(CircuitState::Open as u8, Ordering::Release);

        warn!(
            component = %self.name,
            consecutive_failures = self.counters.consecutive_failures.load(Ordering::Relaxed),
            failure_threshold = self.config.failure_threshold,
            timeout_seconds = self.config.timeout.as_secs(),
            "Circuit breaker opened (failing fast)"
        );
    }

    fn transition_to_half_open(&self) {
        self.counters.half_open_calls.store(0, Ordering::Relaxed);
        self.state
            .store(CircuitState::HalfOpen as u8, Ordering::Release);

        info!(
            component = %self.name,
            success_threshold = self.config.success_threshold,
            "Circuit breaker half-open (testing recovery)"
        );
    }

    pub fn force_open(&self) {
        warn!(component = %self.name, "Circuit breaker forced open");
        self.transition_to_open();
    }

    pub fn force_closed(&self) {
        warn!(component = %self.name, "Circuit breaker forced closed");
        self.transition_to_closed();
    }

    pub fn metrics(&self) -> CircuitBreakerMetrics {
        self.counters.snapshot(self.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn config(failure_threshold: u32, timeout_ms: u64, success_threshold: u32) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold,
            timeout: Duration::from_millis(timeout_ms),
            success_threshold,
        }
    }

    #[tokio::test]
    async fn test_circuit_breaker_normal_operation() {
        let circuit = CircuitBreaker::new("test".to_string(), config(3, 100, 2));
        assert_eq!(circuit.state(), CircuitState::Closed);

        let result = circuit.call(|| async { Ok::<_, String>("success") }).await;
        assert!(result.is_ok());

        let metrics = circuit.metrics();
        assert_eq!(metrics.total_calls, 1);
        assert_eq!(metrics.success_count, 1);
        assert_eq!(metrics.failure_count, 0);
    }

    #[tokio::test]
    async fn test_circuit_breaker_opens_on_failures() {
        let circuit = CircuitBreaker::new("test".to_string(), config(2, 100, 2));

        let _ = circuit.call(|| async { Err::<String, _>("error") }).await;
        assert_eq!(circuit.state(), CircuitState::Closed);

        let _ = circuit.call(|| async { Err::<String, _>("error") }).await;
        assert_eq!(circuit.state(), CircuitState::Open);

        let result = circuit
            .call(|| async { Ok::<_, String>("should not execute") })
            .await;
        assert!(matches!(result, Err(CircuitBreakerError::CircuitOpen { .. })));
    }

    #[tokio::test]
    async fn test_circuit_breaker_recovery() {
        let circuit = CircuitBreaker::new("test".to_string(), config(1, 50, 1));

        let _ = circuit.call(|| async { Err::<String, _>("error") }).await;
        assert_eq!(circuit.state(), CircuitState::Open);

        sleep(Duration::from_millis(60)).await;

        let result = circuit.call(|| async { Ok::<_, String>("success") }).await;
        assert!(result.is_ok());
        assert_eq!(circuit.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_failure_reopens() {
        let circuit = CircuitBreaker::new("test".to_string(), config(1, 20, 2));
        circuit.record_failure_manual(Duration::from_millis(1));
        assert_eq!(circuit.state(), CircuitState::Open);

        sleep(Duration::from_millis(30)).await;
        assert!(circuit.should_allow());
        assert_eq!(circuit.state(), CircuitState::HalfOpen);

        circuit.record_failure_manual(Duration::from_millis(1));
        assert_eq!(circuit.state(), CircuitState::Open);
        assert!(!circuit.should_allow());
    }

    #[test]
    fn test_force_operations() {
        let circuit = CircuitBreaker::new("test".to_string(), config(1, 1000, 1));

        circuit.force_open();
        assert_eq!(circuit.state(), CircuitState::Open);
        assert!(!circuit.should_allow());

        circuit.force_closed();
        assert_eq!(circuit.state(), CircuitState::Closed);
        assert!(circuit.should_allow());
    }

    #[test]
    fn test_success_resets_consecutive_failures() {
        let circuit = CircuitBreaker::new("test".to_string(), config(3, 1000, 1));
        circuit.record_failure_manual(Duration::from_millis(1));
        circuit.record_failure_manual(Duration::from_millis(1));
        circuit.record_success_manual(Duration::from_millis(1));
        circuit.record_failure_manual(Duration::from_millis(1));
        circuit.record_failure_manual(Duration::from_millis(1));
        assert_eq!(circuit.state(), CircuitState::Closed);

        let metrics = circuit.metrics();
        assert_eq!(metrics.total_calls, 5);
        assert_eq!(metrics.failure_count, 4);
        assert!((metrics.failure_rate - 0.8).abs() < f64::EPSILON);
    }
}
