//! Consecutive-failure circuit breaker.
//!
//! - `Closed`: calls pass; `failure_threshold` consecutive failures open it.
//! - `Open`: calls are skipped until `recovery_timeout_ms` has elapsed, then
//!   the breaker moves to `HalfOpen`.
//! - `HalfOpen`: trial calls pass; `success_threshold` successes close it,
//!   any failure opens it again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use redop_core::{CallSite, CircuitBreaker};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures before the breaker opens.
    pub failure_threshold: u32,
    /// Time spent open before trial calls are allowed (ms).
    pub recovery_timeout_ms: u64,
    /// Successful trial calls needed to close again.
    pub success_threshold: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout_ms: 30_000,
            success_threshold: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
    half_open_successes: u32,
    opened_at: Option<Instant>,
}

// ---------------------------------------------------------------------------
// ThresholdCircuitBreaker
// ---------------------------------------------------------------------------

pub struct ThresholdCircuitBreaker {
    config: BreakerConfig,
    inner: Mutex<Inner>,
    skipped: AtomicU64,
    failures: AtomicU64,
}

impl ThresholdCircuitBreaker {
    #[must_use]
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                half_open_successes: 0,
                opened_at: None,
            }),
            skipped: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn state(&self) -> BreakerState {
        self.inner.lock().state
    }

    /// Calls skipped while out of service.
    #[must_use]
    pub fn skipped_calls(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    /// Failures reported through `on_exception`.
    #[must_use]
    pub fn failed_calls(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    fn recovery_timeout(&self) -> Duration {
        Duration::from_millis(self.config.recovery_timeout_ms)
    }

    fn open(inner: &mut Inner) {
        inner.state = BreakerState::Open;
        inner.opened_at = Some(Instant::now());
        inner.half_open_successes = 0;
    }
}

impl Default for ThresholdCircuitBreaker {
    fn default() -> Self {
        Self::new(BreakerConfig::default())
    }
}

impl CircuitBreaker for ThresholdCircuitBreaker {
    fn is_out_of_service(&self) -> bool {
        let mut inner = self.inner.lock();
        match inner.state {
            BreakerState::Closed | BreakerState::HalfOpen => false,
            BreakerState::Open => {
                let elapsed = inner.opened_at.map_or(Duration::MAX, |t| t.elapsed());
                if elapsed >= self.recovery_timeout() {
                    inner.state = BreakerState::HalfOpen;
                    inner.half_open_successes = 0;
                    info!("circuit breaker half-open, allowing trial calls");
                    false
                } else {
                    true
                }
            }
        }
    }

    fn out_of_service(&self, call: &CallSite<'_>) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
        debug!(
            owner = call.owner,
            method = %call.method,
            key = call.key,
            "call skipped, store out of service"
        );
    }

    fn on_exception(&self, call: &CallSite<'_>, error: &anyhow::Error) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        let mut inner = self.inner.lock();
        match inner.state {
            BreakerState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.config.failure_threshold {
                    Self::open(&mut inner);
                    warn!(
                        owner = call.owner,
                        method = %call.method,
                        failures = inner.consecutive_failures,
                        error = %error,
                        "circuit breaker opened"
                    );
                }
            }
            BreakerState::HalfOpen => {
                Self::open(&mut inner);
                warn!(
                    owner = call.owner,
                    method = %call.method,
                    error = %error,
                    "trial call failed, circuit breaker reopened"
                );
            }
            BreakerState::Open => {}
        }
    }

    fn on_success(&self, _call: &CallSite<'_>) {
        let mut inner = self.inner.lock();
        match inner.state {
            BreakerState::Closed => inner.consecutive_failures = 0,
            BreakerState::HalfOpen => {
                inner.half_open_successes += 1;
                if inner.half_open_successes >= self.config.success_threshold {
                    inner.state = BreakerState::Closed;
                    inner.consecutive_failures = 0;
                    inner.opened_at = None;
                    info!("circuit breaker closed");
                }
            }
            BreakerState::Open => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use redop_core::{Method, Value};

    use super::*;

    fn breaker(failure_threshold: u32, recovery_timeout_ms: u64) -> ThresholdCircuitBreaker {
        ThresholdCircuitBreaker::new(BreakerConfig {
            failure_threshold,
            recovery_timeout_ms,
            success_threshold: 2,
        })
    }

    fn fail(b: &ThresholdCircuitBreaker, method: &Method) {
        let call = CallSite {
            key: Some("k"),
            owner: "Cache",
            method,
            args: &[] as &[Value],
        };
        b.on_exception(&call, &anyhow::anyhow!("connection refused"));
    }

    fn succeed(b: &ThresholdCircuitBreaker, method: &Method) {
        let call = CallSite {
            key: None,
            owner: "Cache",
            method,
            args: &[],
        };
        b.on_success(&call);
    }

    #[test]
    fn opens_after_threshold() {
        let method = Method::builder("Cache", "get").build();
        let b = breaker(3, 60_000);
        fail(&b, &method);
        fail(&b, &method);
        assert!(!b.is_out_of_service());
        fail(&b, &method);
        assert_eq!(b.state(), BreakerState::Open);
        assert!(b.is_out_of_service());
        assert_eq!(b.failed_calls(), 3);
    }

    #[test]
    fn success_resets_consecutive_failures() {
        let method = Method::builder("Cache", "get").build();
        let b = breaker(2, 60_000);
        fail(&b, &method);
        succeed(&b, &method);
        fail(&b, &method);
        assert_eq!(b.state(), BreakerState::Closed);
    }

    #[test]
    fn half_open_after_timeout_then_closes() {
        let method = Method::builder("Cache", "get").build();
        let b = breaker(1, 0);
        fail(&b, &method);
        assert_eq!(b.state(), BreakerState::Open);

        assert!(!b.is_out_of_service());
        assert_eq!(b.state(), BreakerState::HalfOpen);

        succeed(&b, &method);
        assert_eq!(b.state(), BreakerState::HalfOpen);
        succeed(&b, &method);
        assert_eq!(b.state(), BreakerState::Closed);
    }

    #[test]
    fn half_open_failure_reopens() {
        let method = Method::builder("Cache", "get").build();
        let b = breaker(1, 0);
        fail(&b, &method);
        assert!(!b.is_out_of_service());
        fail(&b, &method);
        assert_eq!(b.state(), BreakerState::Open);
    }

    #[test]
    fn counts_skipped_calls() {
        let method = Method::builder("Cache", "get").build();
        let b = ThresholdCircuitBreaker::default();
        let call = CallSite {
            key: None,
            owner: "Cache",
            method: &method,
            args: &[],
        };
        b.out_of_service(&call);
        b.out_of_service(&call);
        assert_eq!(b.skipped_calls(), 2);
    }
}
