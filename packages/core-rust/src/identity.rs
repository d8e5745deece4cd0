//! Operation identities: a tag set folded into one 64-bit dispatch key.
//!
//! For every tag attached to an operation the generator takes `1 << index`
//! and XOR-accumulates it, starting from zero. XOR is kept deliberately: a tag
//! attached twice cancels itself out, so `{t, t}` and `{}` share an identity.
//! Resolution logs a warning when a declaration carries a repeated tag.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capability::Tag;
use crate::error::ConfigError;
use crate::index::CapabilityIndex;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Integer fingerprint of a capability tag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(u64);

impl Identity {
    /// Identity of the empty tag set.
    pub const EMPTY: Identity = Identity(0);

    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

// ---------------------------------------------------------------------------
// IdentityGenerator
// ---------------------------------------------------------------------------

/// Converts tag sets into identities using one domain's capability index.
#[derive(Debug, Clone)]
pub struct IdentityGenerator {
    index: CapabilityIndex,
}

impl IdentityGenerator {
    #[must_use]
    pub fn new(index: CapabilityIndex) -> Self {
        Self { index }
    }

    #[must_use]
    pub fn index(&self) -> &CapabilityIndex {
        &self.index
    }

    /// Bit mask for a single tag.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownCapability` if `tag` is not registered.
    pub fn mask_of(&self, tag: &Tag) -> Result<u64, ConfigError> {
        Ok(1u64 << self.index.index_of(tag)?)
    }

    /// XOR-folds `1 << index_of(tag)` over `tags`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownCapability` for the first unregistered tag.
    pub fn identity_of<'a, I>(&self, tags: I) -> Result<Identity, ConfigError>
    where
        I: IntoIterator<Item = &'a Tag>,
    {
        tags.into_iter()
            .try_fold(0u64, |acc, tag| Ok(acc ^ self.mask_of(tag)?))
            .map(Identity)
    }

    /// Returns `true` if the bit for `tag` is set in `identity`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownCapability` if `tag` is not registered.
    pub fn supports(&self, identity: Identity, tag: &Tag) -> Result<bool, ConfigError> {
        let mask = self.mask_of(tag)?;
        Ok(identity.0 & mask == mask)
    }
}

/// Returns `true` if any tag occurs more than once in `tags`.
#[must_use]
pub fn has_duplicates(tags: &[Tag]) -> bool {
    let mut seen = HashSet::with_capacity(tags.len());
    tags.iter().any(|tag| !seen.insert(*tag))
}
