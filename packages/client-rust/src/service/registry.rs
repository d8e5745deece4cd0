use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::info;

use redop_core::ConfigError;

use super::mapping::ExecutorsMapping;
use crate::domain::Domain;

// ---------------------------------------------------------------------------
// MappingRegistry
// ---------------------------------------------------------------------------

/// Owner of the per-domain executors mappings.
///
/// Each domain's mapping is built at most once, the first time a client for
/// that domain is created, and shared by every client afterwards. Pass the
/// registry (or an `Arc` of it) to wherever clients are built.
pub struct MappingRegistry {
    by_domain: DashMap<Domain, Arc<ExecutorsMapping>>,
}

impl MappingRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_domain: DashMap::new(),
        }
    }

    /// Registers a prebuilt mapping, replacing any earlier one for its domain.
    pub fn register(&self, mapping: ExecutorsMapping) -> Arc<ExecutorsMapping> {
        let domain = mapping.domain();
        let arc = Arc::new(mapping);
        self.by_domain.insert(domain, Arc::clone(&arc));
        arc
    }

    /// Retrieve the mapping of a domain, if it has been built.
    pub fn get(&self, domain: Domain) -> Option<Arc<ExecutorsMapping>> {
        self.by_domain
            .get(&domain)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Returns the domain's mapping, building it with `build` if absent.
    ///
    /// `build` runs at most once per domain even under concurrent callers.
    ///
    /// # Errors
    ///
    /// Propagates the `ConfigError` returned by `build`; nothing is cached then.
    pub fn get_or_try_init<F>(&self, domain: Domain, build: F) -> Result<Arc<ExecutorsMapping>, ConfigError>
    where
        F: FnOnce() -> Result<ExecutorsMapping, ConfigError>,
    {
        if let Some(existing) = self.get(domain) {
            return Ok(existing);
        }
        match self.by_domain.entry(domain) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let mapping = Arc::new(build()?);
                info!(
                    domain = %domain,
                    executors = mapping.executor_count(),
                    "domain mapping initialized"
                );
                entry.insert(Arc::clone(&mapping));
                Ok(mapping)
            }
        }
    }

    /// Domains whose mapping has been built.
    #[must_use]
    pub fn domains(&self) -> Vec<Domain> {
        let mut domains: Vec<Domain> = self.by_domain.iter().map(|e| *e.key()).collect();
        domains.sort();
        domains
    }
}

impl Default for MappingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
