//! redop core: capability tags, operation identities, operation declarations,
//! and the collaborator contracts of the dispatch engine.

pub mod capability;
pub mod context;
pub mod error;
pub mod identity;
pub mod index;
pub mod method;
pub mod traits;

pub use capability::{Capability, Tag};
pub use context::{ArgSlot, ArgSource, Codec, ContextShape, InvocationContext, TimeUnit};
pub use error::{ConfigError, ContextError};
pub use identity::{Identity, IdentityGenerator};
pub use index::{CapabilityIndex, MAX_CAPABILITIES};
pub use method::{Method, MethodBuilder, Param, TypeCatalog, TypeDecl, TypeRef};
pub use serde_json::Value;
pub use traits::{CallSite, CircuitBreaker, Executor, KeyResolver, SlowOperationSink};
