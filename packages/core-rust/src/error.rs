//! Error types for capability registration and invocation-context building.

/// Defects in a domain's capability registration list.
///
/// Raised while a domain mapping is constructed; never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("capability `{tag}` registered twice in domain `{domain}` (indices {first} and {second})")]
    DuplicateCapability {
        domain: &'static str,
        tag: &'static str,
        first: u32,
        second: u32,
    },
    #[error("domain `{domain}` registers {count} capabilities, at most {max} fit in an identity")]
    TooManyCapabilities {
        domain: &'static str,
        count: usize,
        max: usize,
    },
    #[error("capability `{tag}` is not registered in domain `{domain}`")]
    UnknownCapability {
        domain: &'static str,
        tag: &'static str,
    },
}

/// Failures while building an `InvocationContext` for one call.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("`{method}` declares {expected} parameters but was called with {actual} arguments")]
    ArityMismatch {
        method: String,
        expected: usize,
        actual: usize,
    },
    #[error("`{method}` needs a key but neither it nor `{owner}` declares a key template")]
    MissingKeyTemplate { method: String, owner: String },
    #[error("`{method}` has no argument for slot `{slot}`")]
    MissingArgument { method: String, slot: &'static str },
    #[error("key resolution failed for `{method}`: {source}")]
    KeyResolution {
        method: String,
        #[source]
        source: anyhow::Error,
    },
}
