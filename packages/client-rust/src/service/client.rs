//! Client handles for declared client types.
//!
//! A [`ClientFactory`] owns the pieces shared by every client: the mapping
//! registry, request metrics, circuit breaker and slow-operation log. Each
//! [`DomainClient`] drives one declared type; hand-written clients hold
//! [`BoundOperation`]s, resolved once when the operation is bound.

use std::sync::Arc;

use tracing::debug;

use redop_core::{CircuitBreaker, KeyResolver, Method, TypeCatalog, TypeRef, Value};

use super::config::DispatchConfig;
use super::invoker::Invoker;
use super::mapping::{ExecutorsMapping, MappingBuilder};
use super::metrics::RequestMetrics;
use super::operation::{DispatchError, InvokeError};
use super::registry::MappingRegistry;
use super::slow_ops::SlowOperationRegistry;
use crate::domain::Domain;

// ---------------------------------------------------------------------------
// ClientFactory
// ---------------------------------------------------------------------------

/// Creates [`DomainClient`]s that share one set of collaborators.
pub struct ClientFactory {
    registry: Arc<MappingRegistry>,
    metrics: Arc<RequestMetrics>,
    slow_ops: Arc<SlowOperationRegistry>,
    breaker: Option<Arc<dyn CircuitBreaker>>,
    key_resolver: Option<Arc<dyn KeyResolver>>,
    config: DispatchConfig,
}

impl ClientFactory {
    #[must_use]
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            registry: Arc::new(MappingRegistry::new()),
            metrics: RequestMetrics::new(),
            slow_ops: Arc::new(SlowOperationRegistry::new(config.slow_operation_capacity)),
            breaker: None,
            key_resolver: None,
            config,
        }
    }

    /// Shares an existing mapping registry instead of a private one.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<MappingRegistry>) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_circuit_breaker(mut self, breaker: Arc<dyn CircuitBreaker>) -> Self {
        self.breaker = Some(breaker);
        self
    }

    #[must_use]
    pub fn with_key_resolver(mut self, resolver: Arc<dyn KeyResolver>) -> Self {
        self.key_resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<MappingRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn metrics(&self) -> &Arc<RequestMetrics> {
        &self.metrics
    }

    #[must_use]
    pub fn slow_operations(&self) -> &Arc<SlowOperationRegistry> {
        &self.slow_ops
    }

    /// Creates a client for the declared type `owner` of `domain`.
    ///
    /// `register` fills the domain's executor table. It runs only for the
    /// first client of a domain; later clients reuse the mapping built then.
    ///
    /// # Errors
    ///
    /// - `DispatchError::Config` if the domain's capability index or a
    ///   registered identity is invalid
    /// - `DispatchError::UnsupportedOperation` if a method of `owner` does not
    ///   resolve to an executor
    pub fn create<F>(
        &self,
        domain: Domain,
        owner: &'static str,
        catalog: Arc<TypeCatalog>,
        register: F,
    ) -> Result<DomainClient, DispatchError>
    where
        F: FnOnce(&mut MappingBuilder) -> Result<(), redop_core::ConfigError>,
    {
        let mapping = self.registry.get_or_try_init(domain, || {
            let mut builder = ExecutorsMapping::builder(domain)?;
            register(&mut builder)?;
            Ok(builder.build())
        })?;

        let mut invoker = Invoker::builder(owner, mapping, catalog)
            .metrics(Arc::clone(&self.metrics))
            .slow_operations(self.slow_ops.clone())
            .config(self.config.clone());
        if let Some(breaker) = &self.breaker {
            invoker = invoker.circuit_breaker(Arc::clone(breaker));
        }
        if let Some(resolver) = &self.key_resolver {
            invoker = invoker.key_resolver(Arc::clone(resolver));
        }

        let client = DomainClient::new(invoker.build());
        let prepared = client.invoker.prepare()?;
        debug!(domain = %domain, owner, prepared, "client created");
        Ok(client)
    }
}

impl Default for ClientFactory {
    fn default() -> Self {
        Self::new(DispatchConfig::default())
    }
}

// ---------------------------------------------------------------------------
// DomainClient
// ---------------------------------------------------------------------------

/// Client for one declared type.
#[derive(Clone)]
pub struct DomainClient {
    invoker: Arc<Invoker>,
}

impl DomainClient {
    #[must_use]
    pub fn new(invoker: Invoker) -> Self {
        Self {
            invoker: Arc::new(invoker),
        }
    }

    #[must_use]
    pub fn owner(&self) -> &'static str {
        self.invoker.owner()
    }

    #[must_use]
    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// Binds the operation `name(param_types..)` of this client's type.
    ///
    /// # Errors
    ///
    /// - `DispatchError::UnknownMethod` if the type declares no such method
    /// - `DispatchError::UnsupportedOperation` if it does not resolve
    pub fn operation(
        &self,
        name: &str,
        param_types: &[TypeRef],
    ) -> Result<BoundOperation, DispatchError> {
        let owner = self.invoker.owner();
        let method = self
            .invoker
            .catalog()
            .method(owner, name, param_types)
            .ok_or_else(|| DispatchError::UnknownMethod {
                owner: owner.to_string(),
                method: name.to_string(),
            })?;
        self.invoker.resolve(&method)?;
        Ok(BoundOperation {
            invoker: Arc::clone(&self.invoker),
            method,
        })
    }

    /// Calls `method` directly.
    ///
    /// # Errors
    ///
    /// See [`Invoker::invoke`].
    pub fn call(&self, method: &Method, args: &[Value]) -> Result<Value, InvokeError> {
        self.invoker.invoke(method, args)
    }
}

// ---------------------------------------------------------------------------
// BoundOperation
// ---------------------------------------------------------------------------

/// A resolved operation of a [`DomainClient`].
#[derive(Clone)]
pub struct BoundOperation {
    invoker: Arc<Invoker>,
    method: Method,
}

impl BoundOperation {
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// # Errors
    ///
    /// See [`Invoker::invoke`].
    pub fn call(&self, args: &[Value]) -> Result<Value, InvokeError> {
        self.invoker.invoke(&self.method, args)
    }
}

impl std::fmt::Debug for BoundOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundOperation")
            .field("owner", &self.invoker.owner())
            .field("method", &self.method.to_string())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
