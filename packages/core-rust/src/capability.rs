//! Capability tags: the semantic modifiers attached to a declared operation.
//!
//! A capability is a zero-sized marker type (e.g. `IfAbsent`, `WithScores`).
//! At runtime a marker is carried as a [`Tag`], which compares and hashes by
//! the marker's `TypeId`. Tags are domain-scoped: two domains may each declare
//! their own `Add` marker and those are distinct tags.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

// ---------------------------------------------------------------------------
// Capability trait
// ---------------------------------------------------------------------------

/// Marker trait implemented by every capability type.
///
/// Use the [`capabilities!`](crate::capabilities) macro rather than
/// implementing this by hand.
pub trait Capability: 'static {
    /// Human-readable name used in diagnostics.
    const NAME: &'static str;
}

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// Runtime handle for a capability marker type.
#[derive(Clone, Copy)]
pub struct Tag {
    id: TypeId,
    name: &'static str,
}

impl Tag {
    /// Returns the tag for capability `C`.
    #[must_use]
    pub fn of<C: Capability>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: C::NAME,
        }
    }

    /// Diagnostic name of the capability.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if this tag is the tag of capability `C`.
    #[must_use]
    pub fn is<C: Capability>(&self) -> bool {
        self.id == TypeId::of::<C>()
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ---------------------------------------------------------------------------
// Declaration macros
// ---------------------------------------------------------------------------

/// Declares one or more capability marker types.
///
/// ```
/// redop_core::capabilities! {
///     /// Only write when the key does not exist.
///     pub IfAbsent = "if-absent",
///     pub WithScores = "with-scores",
/// }
///
/// use redop_core::capability::{Capability, Tag};
/// assert_eq!(IfAbsent::NAME, "if-absent");
/// assert!(Tag::of::<WithScores>().is::<WithScores>());
/// ```
#[macro_export]
macro_rules! capabilities {
    (
        $(
            $(#[$meta:meta])*
            $vis:vis $name:ident = $label:literal
        ),* $(,)?
    ) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
            $vis struct $name;

            impl $crate::capability::Capability for $name {
                const NAME: &'static str = $label;
            }
        )*
    };
}

/// Builds an array of [`Tag`]s from capability marker types.
///
/// ```
/// use redop_core::capability::shared::{Expire, Millis};
/// let tags = redop_core::tags![Expire, Millis];
/// assert_eq!(tags.len(), 2);
/// ```
#[macro_export]
macro_rules! tags {
    ($($cap:ty),* $(,)?) => {
        [$($crate::capability::Tag::of::<$cap>()),*]
    };
}

// ---------------------------------------------------------------------------
// Shared tags
// ---------------------------------------------------------------------------

/// Tags shared by every domain. The base tags are registered first in each
/// domain's capability index.
pub mod shared {
    use super::Tag;

    crate::capabilities! {
        /// Marks a parameter as supplying a key-template variable.
        ///
        /// Key-construction metadata only: never part of an operation identity.
        pub KeyVar = "key-var",
        /// The operation sets a time-to-live on the key.
        pub Expire = "expire",
        /// The operation takes a timeout argument.
        pub Timeout = "timeout",
        /// Time arguments are expressed in milliseconds.
        pub Millis = "millis",
        /// Time arguments are expressed in seconds.
        pub Seconds = "seconds",
    }

    /// Base tags in registration order. `KeyVar` is deliberately absent.
    #[must_use]
    pub fn base() -> Vec<Tag> {
        crate::tags![Expire, Timeout, Millis, Seconds].to_vec()
    }
}
