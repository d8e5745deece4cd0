//! Invocation pipeline: the single entry point every declared operation call
//! passes through.
//!
//! Per call, in order:
//! 1. count the call in (metrics enabled)
//! 2. resolve the executor; failures propagate unwrapped
//! 3. build the invocation context (key + argument bindings)
//! 4. skip the call if the circuit breaker reports the store out of service
//! 5. execute
//! 6. log and record the call if it was slow
//!
//! Failures in steps 3-6 go to the circuit breaker when one is configured
//! (the call then returns `Value::Null`), otherwise they are wrapped in
//! `InvokeError::Execution`. The call is counted out on every exit path.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug_span, warn};

use redop_core::capability::shared::{Millis, Seconds};
use redop_core::{
    CallSite, CircuitBreaker, Executor, InvocationContext, KeyResolver, Method,
    SlowOperationSink, Tag, TimeUnit, TypeCatalog, TypeDecl, Value,
};

use super::config::DispatchConfig;
use super::key::TemplateKeyResolver;
use super::mapping::ExecutorsMapping;
use super::metrics::{self as request_metrics, RequestMetrics};
use super::operation::{DispatchError, InvokeError, Outcome};
use super::slow_ops::SlowOperationRegistry;

// ---------------------------------------------------------------------------
// InvokerBuilder
// ---------------------------------------------------------------------------

pub struct InvokerBuilder {
    owner: &'static str,
    mapping: Arc<ExecutorsMapping>,
    catalog: Arc<TypeCatalog>,
    key_resolver: Option<Arc<dyn KeyResolver>>,
    breaker: Option<Arc<dyn CircuitBreaker>>,
    slow_ops: Option<Arc<dyn SlowOperationSink>>,
    metrics: Option<Arc<RequestMetrics>>,
    config: DispatchConfig,
}

impl InvokerBuilder {
    /// Replaces the default [`TemplateKeyResolver`].
    #[must_use]
    pub fn key_resolver(mut self, resolver: Arc<dyn KeyResolver>) -> Self {
        self.key_resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn circuit_breaker(mut self, breaker: Arc<dyn CircuitBreaker>) -> Self {
        self.breaker = Some(breaker);
        self
    }

    /// Sink for slow-operation events. Without one, a
    /// [`SlowOperationRegistry`] sized by the config is used.
    #[must_use]
    pub fn slow_operations(mut self, sink: Arc<dyn SlowOperationSink>) -> Self {
        self.slow_ops = Some(sink);
        self
    }

    /// Shares an active-request counter across invokers.
    #[must_use]
    pub fn metrics(mut self, metrics: Arc<RequestMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    #[must_use]
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn build(self) -> Invoker {
        let metrics = if self.config.metrics_enabled {
            Some(self.metrics.unwrap_or_default())
        } else {
            None
        };
        let slow_ops = match self.config.slow_operation_threshold_ms {
            Some(_) => Some(self.slow_ops.unwrap_or_else(|| {
                Arc::new(SlowOperationRegistry::new(self.config.slow_operation_capacity))
            })),
            None => None,
        };
        Invoker {
            owner: self.owner,
            mapping: self.mapping,
            catalog: self.catalog,
            key_resolver: self
                .key_resolver
                .unwrap_or_else(|| Arc::new(TemplateKeyResolver)),
            breaker: self.breaker,
            slow_ops,
            metrics,
            config: self.config,
        }
    }
}

// ---------------------------------------------------------------------------
// Invoker
// ---------------------------------------------------------------------------

/// Drives calls of one declared client type through its domain mapping.
pub struct Invoker {
    owner: &'static str,
    mapping: Arc<ExecutorsMapping>,
    catalog: Arc<TypeCatalog>,
    key_resolver: Arc<dyn KeyResolver>,
    breaker: Option<Arc<dyn CircuitBreaker>>,
    slow_ops: Option<Arc<dyn SlowOperationSink>>,
    metrics: Option<Arc<RequestMetrics>>,
    config: DispatchConfig,
}

/// Result of the part of a call that may fail recoverably.
enum Step {
    Done(Value),
    Skipped,
}

impl Invoker {
    /// Starts an invoker for calls declared on `owner`.
    #[must_use]
    pub fn builder(
        owner: &'static str,
        mapping: Arc<ExecutorsMapping>,
        catalog: Arc<TypeCatalog>,
    ) -> InvokerBuilder {
        InvokerBuilder {
            owner,
            mapping,
            catalog,
            key_resolver: None,
            breaker: None,
            slow_ops: None,
            metrics: None,
            config: DispatchConfig::default(),
        }
    }

    /// Name of the declared client type.
    #[must_use]
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    #[must_use]
    pub fn mapping(&self) -> &Arc<ExecutorsMapping> {
        &self.mapping
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    /// The shared active-request counter, when metrics are enabled.
    #[must_use]
    pub fn request_metrics(&self) -> Option<&Arc<RequestMetrics>> {
        self.metrics.as_ref()
    }

    /// Resolves `method` without calling it.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::UnsupportedOperation` if no executor matches.
    pub fn resolve(&self, method: &Method) -> Result<Arc<dyn Executor>, DispatchError> {
        self.mapping.resolve(&self.catalog, method)
    }

    /// Resolves every method of the owner type up front.
    ///
    /// Returns the number of methods resolved.
    ///
    /// # Errors
    ///
    /// Returns the first `DispatchError` encountered.
    pub fn prepare(&self) -> Result<usize, DispatchError> {
        let Some(decl) = self.catalog.get(self.owner) else {
            return Ok(0);
        };
        for method in decl.methods() {
            self.resolve(method)?;
        }
        Ok(decl.methods().len())
    }

    /// Calls `method` with `args`.
    ///
    /// Returns `Value::Null` when the call was skipped by, or its failure
    /// handed to, the circuit breaker.
    ///
    /// # Errors
    ///
    /// - `InvokeError::Dispatch` if `method` does not resolve to an executor
    /// - `InvokeError::Execution` if the call failed and no breaker is configured
    pub fn invoke(&self, method: &Method, args: &[Value]) -> Result<Value, InvokeError> {
        let start = Instant::now();
        let _active = self.metrics.as_deref().map(RequestMetrics::enter);
        let _span = debug_span!("invoke", owner = self.owner, method = %method).entered();

        let executor = match self.resolve(method) {
            Ok(executor) => executor,
            Err(err) => {
                self.finish(method, start, Outcome::Error);
                return Err(err.into());
            }
        };

        let mut key = None;
        match self.run(method, args, executor.as_ref(), &mut key, start) {
            Ok(Step::Done(value)) => {
                if let Some(breaker) = &self.breaker {
                    breaker.on_success(&self.call_site(key.as_deref(), method, args));
                }
                self.finish(method, start, Outcome::Ok);
                Ok(value)
            }
            Ok(Step::Skipped) => {
                self.finish(method, start, Outcome::Skipped);
                Ok(Value::Null)
            }
            Err(error) => {
                if let Some(breaker) = &self.breaker {
                    breaker.on_exception(&self.call_site(key.as_deref(), method, args), &error);
                    self.finish(method, start, Outcome::Degraded);
                    return Ok(Value::Null);
                }
                self.finish(method, start, Outcome::Error);
                Err(InvokeError::Execution {
                    owner: self.owner.to_string(),
                    method: method.name().to_string(),
                    source: error,
                })
            }
        }
    }

    fn run(
        &self,
        method: &Method,
        args: &[Value],
        executor: &dyn Executor,
        key: &mut Option<String>,
        start: Instant,
    ) -> anyhow::Result<Step> {
        let ctx = self.build_context(method, executor, args)?;
        *key = ctx.key().map(str::to_owned);

        if let Some(breaker) = &self.breaker {
            if breaker.is_out_of_service() {
                breaker.out_of_service(&self.call_site(ctx.key(), method, args));
                if self.metrics.is_some() {
                    request_metrics::record_breaker_skip(self.owner);
                }
                return Ok(Step::Skipped);
            }
        }

        let value = executor.execute(&ctx)?;
        self.check_slow(method, start.elapsed());
        Ok(Step::Done(value))
    }

    /// Builds the context from the actual method, so tagged slots and key
    /// variables bind the same parameters on every call.
    fn build_context(
        &self,
        method: &Method,
        executor: &dyn Executor,
        args: &[Value],
    ) -> anyhow::Result<InvocationContext> {
        let actual = self
            .mapping
            .actual_method(&self.catalog, method)
            .unwrap_or_else(|| method.clone());
        let template = actual
            .key_template()
            .or_else(|| self.catalog.get(actual.owner()).and_then(TypeDecl::default_key_template))
            .or_else(|| method.key_template())
            .or_else(|| self.catalog.get(self.owner).and_then(TypeDecl::default_key_template));
        let codec = actual
            .codec()
            .or_else(|| method.codec())
            .unwrap_or(self.config.default_codec);

        let ctx = InvocationContext::builder(&actual, args)
            .key_template(template)
            .codec(codec)
            .timeout_unit(self.timeout_unit(executor))
            .build(executor.context_shape(), self.key_resolver.as_ref())?;
        Ok(ctx)
    }

    fn timeout_unit(&self, executor: &dyn Executor) -> Option<TimeUnit> {
        let has = |tag: Tag| {
            self.mapping
                .supports(executor.identity(), &tag)
                .unwrap_or(false)
        };
        if has(Tag::of::<Millis>()) {
            Some(TimeUnit::Millis)
        } else if has(Tag::of::<Seconds>()) {
            Some(TimeUnit::Seconds)
        } else {
            None
        }
    }

    fn check_slow(&self, method: &Method, elapsed: Duration) {
        let Some(threshold_ms) = self.config.slow_operation_threshold_ms else {
            return;
        };
        if elapsed < Duration::from_millis(threshold_ms) {
            return;
        }

        #[allow(clippy::cast_possible_truncation)]
        let elapsed_ms = elapsed.as_millis() as u64;
        warn!(
            owner = self.owner,
            method = %method,
            elapsed_ms,
            threshold_ms,
            "slow operation"
        );
        if self.metrics.is_some() {
            request_metrics::record_slow_call(self.owner, method.name());
        }
        if let Some(sink) = &self.slow_ops {
            sink.record(self.owner, method, elapsed);
        }
    }

    fn finish(&self, method: &Method, start: Instant, outcome: Outcome) {
        if self.metrics.is_some() {
            request_metrics::record_call(self.owner, method.name(), start.elapsed(), outcome);
        }
    }

    fn call_site<'a>(
        &'a self,
        key: Option<&'a str>,
        method: &'a Method,
        args: &'a [Value],
    ) -> CallSite<'a> {
        CallSite {
            key,
            owner: self.owner,
            method,
            args,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
