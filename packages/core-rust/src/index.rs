//! Per-domain capability index: assigns each registered tag a bit position.

use std::collections::HashMap;

use crate::capability::Tag;
use crate::error::ConfigError;

/// Number of bit positions available in an [`Identity`](crate::identity::Identity).
pub const MAX_CAPABILITIES: usize = u64::BITS as usize;

// ---------------------------------------------------------------------------
// CapabilityIndexBuilder
// ---------------------------------------------------------------------------

/// Collects tags in registration order. Shared base tags go first, then the
/// domain's own tags.
#[derive(Debug, Clone)]
pub struct CapabilityIndexBuilder {
    domain: &'static str,
    tags: Vec<Tag>,
}

impl CapabilityIndexBuilder {
    /// Appends `tag`; it receives the next free index.
    pub fn register(&mut self, tag: Tag) -> &mut Self {
        self.tags.push(tag);
        self
    }

    /// Appends every tag of `tags` in iteration order.
    pub fn register_all<I: IntoIterator<Item = Tag>>(&mut self, tags: I) -> &mut Self {
        self.tags.extend(tags);
        self
    }

    /// Freezes index assignment and builds the reverse map.
    ///
    /// # Errors
    ///
    /// - `ConfigError::DuplicateCapability` if a tag was registered twice
    /// - `ConfigError::TooManyCapabilities` if the list exceeds [`MAX_CAPABILITIES`]
    pub fn build(&self) -> Result<CapabilityIndex, ConfigError> {
        let mut positions = HashMap::with_capacity(self.tags.len());
        for (i, tag) in self.tags.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let index = i as u32;
            if let Some(&first) = positions.get(tag) {
                return Err(ConfigError::DuplicateCapability {
                    domain: self.domain,
                    tag: tag.name(),
                    first,
                    second: index,
                });
            }
            positions.insert(*tag, index);
        }

        if self.tags.len() > MAX_CAPABILITIES {
            return Err(ConfigError::TooManyCapabilities {
                domain: self.domain,
                count: self.tags.len(),
                max: MAX_CAPABILITIES,
            });
        }

        Ok(CapabilityIndex {
            domain: self.domain,
            tags: self.tags.clone(),
            positions,
        })
    }
}

// ---------------------------------------------------------------------------
// CapabilityIndex
// ---------------------------------------------------------------------------

/// Immutable Tag -> index mapping for one domain.
#[derive(Debug, Clone)]
pub struct CapabilityIndex {
    domain: &'static str,
    tags: Vec<Tag>,
    positions: HashMap<Tag, u32>,
}

impl CapabilityIndex {
    /// Starts an empty registration list for `domain`.
    #[must_use]
    pub fn builder(domain: &'static str) -> CapabilityIndexBuilder {
        CapabilityIndexBuilder {
            domain,
            tags: Vec::new(),
        }
    }

    /// Returns the bit position assigned to `tag`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownCapability` if `tag` was never registered
    /// for this domain.
    pub fn index_of(&self, tag: &Tag) -> Result<u32, ConfigError> {
        self.positions
            .get(tag)
            .copied()
            .ok_or(ConfigError::UnknownCapability {
                domain: self.domain,
                tag: tag.name(),
            })
    }

    #[must_use]
    pub fn contains(&self, tag: &Tag) -> bool {
        self.positions.contains_key(tag)
    }

    #[must_use]
    pub fn domain(&self) -> &'static str {
        self.domain
    }

    /// Registered tags in index order.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
