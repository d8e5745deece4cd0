//! Error and outcome types shared by resolution and the invocation pipeline.

use redop_core::ConfigError;

/// Failures resolving a declared method to an executor.
///
/// Static-shape mismatches: the same declaration fails the same way every
/// time, so these are never retried and never routed to a circuit breaker.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(
        "unsupported operation `{method}` in domain `{domain}` ({reason}); \
         compare the declaration against `{reference}`"
    )]
    UnsupportedOperation {
        method: String,
        domain: &'static str,
        reference: &'static str,
        reason: String,
    },
    #[error("`{owner}` declares no operation `{method}`")]
    UnknownMethod { owner: String, method: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors surfaced to callers of the invocation pipeline.
///
/// Backend failures never escape raw: without a circuit breaker they are
/// wrapped in `Execution`, with one they are swallowed and reported to it.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("operation `{owner}.{method}` failed: {source}")]
    Execution {
        owner: String,
        method: String,
        #[source]
        source: anyhow::Error,
    },
}

/// How a single call ended, used as a metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    /// Skipped because the circuit breaker reported the store out of service.
    Skipped,
    /// Failed and handed to the circuit breaker.
    Degraded,
    Error,
}

impl Outcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Skipped => "skipped",
            Outcome::Degraded => "degraded",
            Outcome::Error => "error",
        }
    }
}
