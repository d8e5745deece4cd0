//! Request metrics for the invocation pipeline.
//!
//! The active-request count lives in an atomic shared by every invoker built
//! from the same [`RequestMetrics`] handle and is mirrored to the
//! `redop_active_requests` gauge. Per-call counters and durations go straight
//! to the `metrics` facade.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge, histogram};

use super::operation::Outcome;

// ---------------------------------------------------------------------------
// RequestMetrics
// ---------------------------------------------------------------------------

/// Shared active-request counter.
#[derive(Debug, Default)]
pub struct RequestMetrics {
    active: AtomicI64,
}

impl RequestMetrics {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Calls currently inside the pipeline.
    #[must_use]
    pub fn active(&self) -> i64 {
        self.active.load(Ordering::Acquire)
    }

    /// Counts one call in; the returned guard counts it out when dropped.
    #[must_use]
    pub fn enter(&self) -> ActiveRequestGuard<'_> {
        self.active.fetch_add(1, Ordering::AcqRel);
        gauge!("redop_active_requests").increment(1.0);
        ActiveRequestGuard { metrics: self }
    }
}

/// Decrements the active-request counter on every exit path.
#[derive(Debug)]
pub struct ActiveRequestGuard<'a> {
    metrics: &'a RequestMetrics,
}

impl Drop for ActiveRequestGuard<'_> {
    fn drop(&mut self) {
        self.metrics.active.fetch_sub(1, Ordering::AcqRel);
        gauge!("redop_active_requests").decrement(1.0);
    }
}

// ---------------------------------------------------------------------------
// Recording helpers
// ---------------------------------------------------------------------------

/// Record one finished call.
pub fn record_call(owner: &str, method: &str, duration: Duration, outcome: Outcome) {
    let labels = [
        ("owner", owner.to_string()),
        ("method", method.to_string()),
        ("outcome", outcome.as_str().to_string()),
    ];
    counter!("redop_operations_total", &labels).increment(1);
    histogram!("redop_operation_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Record a call skipped by the circuit breaker.
pub fn record_breaker_skip(owner: &str) {
    let labels = [("owner", owner.to_string())];
    counter!("redop_breaker_skipped_total", &labels).increment(1);
}

/// Record a slow call.
pub fn record_slow_call(owner: &str, method: &str) {
    let labels = [("owner", owner.to_string()), ("method", method.to_string())];
    counter!("redop_slow_operations_total", &labels).increment(1);
}
