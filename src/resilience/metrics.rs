//! # Circuit Breaker Metrics

use crate::resilience::CircuitState;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Point-in-time metrics for a single circuit breaker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerMetrics {
    pub total_calls: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub consecutive_failures: u64,
    /// Number of calls made in half-open state
    pub half_open_calls: u64,
    pub total_duration: Duration,
    pub current_state: CircuitState,
    /// 0.0 to 1.0
    pub failure_rate: f64,
    /// 0.0 to 1.0
    pub success_rate: f64,
    /// Average duration of successful calls
    pub average_duration: Duration,
}

impl Default for CircuitBreakerMetrics {
    fn default() -> Self {
        Self {
            total_calls: 0,
            success_count: 0,
            failure_count: 0,
            consecutive_failures: 0,
            half_open_calls: 0,
            total_duration: Duration::ZERO,
            current_state: CircuitState::Closed,
            failure_rate: 0.0,
            success_rate: 0.0,
            average_duration: Duration::ZERO,
        }
    }
}
