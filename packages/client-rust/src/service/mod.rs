//! Operation dispatch framework.
//!
//! This module implements the client-side dispatch pipeline:
//!
//! 1. **Mapping** (`mapping`): executor table per domain, method -> executor resolution
//! 2. **Registry** (`registry`): one lazily built mapping per domain
//! 3. **Invoker** (`invoker`): context building, circuit breaking, slow-call detection
//! 4. **Clients** (`client`): client handles and pre-resolved operations
//! 5. **Collaborators** (`key`, `breaker`, `slow_ops`, `metrics`): default implementations

pub mod breaker;
pub mod client;
pub mod config;
pub mod invoker;
pub mod key;
pub mod mapping;
pub mod metrics;
pub mod operation;
pub mod registry;
pub mod slow_ops;

// Re-export key types for convenient access.
pub use breaker::{BreakerConfig, BreakerState, ThresholdCircuitBreaker};
pub use client::{BoundOperation, ClientFactory, DomainClient};
pub use config::DispatchConfig;
pub use invoker::{Invoker, InvokerBuilder};
pub use key::TemplateKeyResolver;
pub use mapping::{ExecutorsMapping, MappingBuilder};
pub use metrics::{ActiveRequestGuard, RequestMetrics};
pub use operation::{DispatchError, InvokeError, Outcome};
pub use registry::MappingRegistry;
pub use slow_ops::{SlowOperation, SlowOperationRegistry};
