//! Functional domains and their capability indexes.

pub mod tags;

use std::fmt;

use serde::{Deserialize, Serialize};

use redop_core::capability::shared;
use redop_core::{CapabilityIndex, ConfigError, Tag};

/// A functional domain. Each domain has its own tags, capability index and
/// executors mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Value,
    Hash,
    Set,
    SortedSet,
    List,
    Geo,
    CrossSet,
    CrossSortedSet,
    CrossList,
    Script,
    Transaction,
    MultiLock,
}

impl Domain {
    pub const ALL: [Domain; 12] = [
        Domain::Value,
        Domain::Hash,
        Domain::Set,
        Domain::SortedSet,
        Domain::List,
        Domain::Geo,
        Domain::CrossSet,
        Domain::CrossSortedSet,
        Domain::CrossList,
        Domain::Script,
        Domain::Transaction,
        Domain::MultiLock,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Domain::Value => "value",
            Domain::Hash => "hash",
            Domain::Set => "set",
            Domain::SortedSet => "sorted_set",
            Domain::List => "list",
            Domain::Geo => "geo",
            Domain::CrossSet => "cross_set",
            Domain::CrossSortedSet => "cross_sorted_set",
            Domain::CrossList => "cross_list",
            Domain::Script => "script",
            Domain::Transaction => "transaction",
            Domain::MultiLock => "multi_lock",
        }
    }

    /// Reference declaration listing every supported operation shape of this
    /// domain. Named in `UnsupportedOperation` errors so a caller can compare
    /// their declaration against it.
    #[must_use]
    pub fn reference_type(self) -> &'static str {
        match self {
            Domain::Value => "ValueTemplate",
            Domain::Hash => "HashTemplate",
            Domain::Set => "SetTemplate",
            Domain::SortedSet => "SortedSetTemplate",
            Domain::List => "ListTemplate",
            Domain::Geo => "GeoTemplate",
            Domain::CrossSet => "CrossSetTemplate",
            Domain::CrossSortedSet => "CrossSortedSetTemplate",
            Domain::CrossList => "CrossListTemplate",
            Domain::Script => "ScriptTemplate",
            Domain::Transaction => "TransactionTemplate",
            Domain::MultiLock => "MultiLockTemplate",
        }
    }

    /// Domain-specific tags in registration order.
    #[must_use]
    pub fn own_tags(self) -> Vec<Tag> {
        match self {
            Domain::Value => tags::value::all(),
            Domain::Hash => tags::hash::all(),
            Domain::Set => tags::set::all(),
            Domain::SortedSet => tags::sorted_set::all(),
            Domain::List => tags::list::all(),
            Domain::Geo => tags::geo::all(),
            Domain::CrossSet => tags::cross_set::all(),
            Domain::CrossSortedSet => tags::cross_sorted_set::all(),
            Domain::CrossList => tags::cross_list::all(),
            Domain::Script => tags::script::all(),
            Domain::Transaction => tags::transaction::all(),
            Domain::MultiLock => tags::multi_lock::all(),
        }
    }

    /// Builds this domain's index: shared base tags first, then its own.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the registration list is defective.
    pub fn capability_index(self) -> Result<CapabilityIndex, ConfigError> {
        CapabilityIndex::builder(self.name())
            .register_all(shared::base())
            .register_all(self.own_tags())
            .build()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
