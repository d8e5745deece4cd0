use std::time::Duration;

use serde_json::Value;

use crate::context::{ContextShape, InvocationContext};
use crate::identity::Identity;
use crate::method::Method;

/// Handler for exactly one concrete operation shape.
///
/// Executors are built once, when a domain mapping is constructed, and are
/// immutable afterwards.
pub trait Executor: Send + Sync {
    /// Name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// The identity this executor was built to satisfy.
    fn identity(&self) -> Identity;

    /// The call-context this executor needs.
    fn context_shape(&self) -> &ContextShape;

    /// Runs the operation against the storage backend.
    ///
    /// # Errors
    ///
    /// Any backend failure. The invocation pipeline routes it to the circuit
    /// breaker or wraps it.
    fn execute(&self, ctx: &InvocationContext) -> anyhow::Result<Value>;
}

/// Everything a circuit breaker is told about one call.
#[derive(Debug, Clone, Copy)]
pub struct CallSite<'a> {
    /// Resolved key, when resolution got that far.
    pub key: Option<&'a str>,
    /// The declared client type the call came through.
    pub owner: &'a str,
    pub method: &'a Method,
    pub args: &'a [Value],
}

/// Fail-fast control invoked inline with every call.
pub trait CircuitBreaker: Send + Sync {
    /// `true` while the backing store should not be called.
    fn is_out_of_service(&self) -> bool;

    /// A call was skipped because the breaker is out of service.
    fn out_of_service(&self, call: &CallSite<'_>);

    /// A call failed. The breaker decides whether and when to trip.
    fn on_exception(&self, call: &CallSite<'_>, error: &anyhow::Error);

    /// A call completed normally.
    fn on_success(&self, _call: &CallSite<'_>) {}
}

/// Substitutes declared variables in a key template using call arguments.
pub trait KeyResolver: Send + Sync {
    /// # Errors
    ///
    /// Fails when the template references a variable no parameter supplies.
    fn resolve(&self, template: &str, method: &Method, args: &[Value]) -> anyhow::Result<String>;
}

/// Receives slow-operation events. Purely observational.
pub trait SlowOperationSink: Send + Sync {
    fn record(&self, owner: &str, method: &Method, elapsed: Duration);
}
