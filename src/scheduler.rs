//! # Cache Write Scheduler
//!
//! Runs best-effort cache writes off the caller's critical path.
//!
//! ```text
//! submit(label, task) → tokio::spawn → [Semaphore permit] → task → ErrorSink on Err
//! ```
//!
//! Concurrency is bounded by a semaphore so a slow cache backend queues work
//! instead of fanning out unbounded tasks. Failures never reach the submitter;
//! they go to the configured [`ErrorSink`]. `wait_idle` lets callers (mostly
//! tests) await every submitted write deterministically.

use crate::cache::CacheError;
use crate::logging::log_error;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{Notify, Semaphore};
use tracing::{debug, warn};

/// Receives failures from scheduled writes
pub trait ErrorSink: Send + Sync {
    fn report(&self, label: &str, error: &CacheError);
}

/// Default sink: structured error log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, label: &str, error: &CacheError) {
        warn!(task = label, error = %error, "Scheduled cache write failed");
        log_error("write_scheduler", label, &error.to_string(), None);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
    pub in_flight: usize,
    pub available_permits: usize,
}

#[derive(Debug, Default)]
struct Counters {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    in_flight: AtomicUsize,
}

struct Shared {
    counters: Counters,
    idle: Notify,
}

/// Decrements the in-flight count even if the task panics
struct InFlightGuard(Arc<Shared>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.0.counters.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

pub struct WriteScheduler {
    semaphore: Arc<Semaphore>,
    sink: Arc<dyn ErrorSink>,
    shared: Arc<Shared>,
    max_concurrent: usize,
    /// Runtime captured at construction, if there was one
    runtime: Option<Handle>,
}

impl std::fmt::Debug for WriteScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteScheduler")
            .field("max_concurrent", &self.max_concurrent)
            .field("stats", &self.stats())
            .finish()
    }
}

impl WriteScheduler {
    pub fn new(max_concurrent: usize) -> Self {
        Self::with_sink(max_concurrent, Arc::new(TracingErrorSink))
    }

    /// `max_concurrent` is clamped to at least one permit.
    ///
    /// When built inside a Tokio runtime, writes are spawned onto that runtime
    /// even if later submitted from elsewhere.
    pub fn with_sink(max_concurrent: usize, sink: Arc<dyn ErrorSink>) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            runtime: Handle::try_current().ok(),
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            sink,
            shared: Arc::new(Shared {
                counters: Counters::default(),
                idle: Notify::new(),
            }),
            max_concurrent,
        }
    }

    /// Spawn writes onto `runtime` instead of the one captured at construction
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Schedule `task` and return immediately.
    ///
    /// Runs on the runtime captured at construction, else the caller's
    /// current runtime. With neither, the write is dropped and reported to
    /// the error sink as a failure.
    pub fn submit<F>(&self, label: impl Into<String>, task: F)
    where
        F: Future<Output = Result<(), CacheError>> + Send + 'static,
    {
        let label = label.into();
        let counters = &self.shared.counters;
        counters.submitted.fetch_add(1, Ordering::Relaxed);

        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            self.sink.report(
                &label,
                &CacheError::BackendError("no Tokio runtime available for cache write".to_string()),
            );
            return;
        };

        counters.in_flight.fetch_add(1, Ordering::AcqRel);

        let guard = InFlightGuard(Arc::clone(&self.shared));
        let semaphore = Arc::clone(&self.semaphore);
        let sink = Arc::clone(&self.sink);

        runtime.spawn(async move {
            let shared = Arc::clone(&guard.0);
            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => task.await,
                Err(_) => Err(CacheError::BackendError(
                    "write scheduler semaphore closed".to_string(),
                )),
            };

            match result {
                Ok(()) => {
                    shared.counters.completed.fetch_add(1, Ordering::Relaxed);
                    debug!(task = %label, "Scheduled cache write completed");
                }
                Err(error) => {
                    shared.counters.failed.fetch_add(1, Ordering::Relaxed);
                    sink.report(&label, &error);
                }
            }
            drop(guard);
        });
    }

    /// Resolve once every write submitted so far has finished
    pub async fn wait_idle(&self) {
        loop {
            let idle = self.shared.idle.notified();
            if self.shared.counters.in_flight.load(Ordering::Acquire) == 0 {
                return;
            }
            idle.await;
        }
    }

    pub fn stats(&self) -> SchedulerStats {
        let counters = &self.shared.counters;
        SchedulerStats {
            submitted: counters.submitted.load(Ordering::Relaxed),
            completed: counters.completed.load(Ordering::Relaxed),
            failed: counters.failed.load(Ordering::Relaxed),
            in_flight: counters.in_flight.load(Ordering::Acquire),
            available_permits: self.semaphore.available_permits(),
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}
