//! redop client: per-domain executor tables, method resolution, and the
//! invocation pipeline behind declared client types.

pub mod domain;
pub mod service;

pub use domain::Domain;
pub use service::{
    BoundOperation, ClientFactory, DispatchConfig, DispatchError, DomainClient, ExecutorsMapping,
    InvokeError, Invoker, MappingRegistry,
};
