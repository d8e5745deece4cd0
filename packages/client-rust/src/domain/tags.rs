//! Capability tags per domain.
//!
//! Each submodule declares the markers of one domain and lists them in
//! registration order. The shared base tags (`redop_core::capability::shared`)
//! are registered ahead of these by [`Domain::capability_index`](super::Domain::capability_index).
//! Changing the order of a list changes every identity in that domain.

use redop_core::{tags, Tag};

/// Plain string/object values.
pub mod value {
    use super::{tags, Tag};

    redop_core::capabilities! {
        pub Get = "get",
        pub Set = "set",
        pub IfAbsent = "if-absent",
        pub IfPresent = "if-present",
        pub GetAndSet = "get-and-set",
        pub Increment = "increment",
        pub Decrement = "decrement",
        pub Append = "append",
        pub Length = "length",
        pub Delete = "delete",
        pub Exists = "exists",
        pub Value = "value",
        pub Delta = "delta",
    }

    #[must_use]
    pub fn all() -> Vec<Tag> {
        tags![
            Get, Set, IfAbsent, IfPresent, GetAndSet, Increment, Decrement, Append, Length,
            Delete, Exists, Value, Delta,
        ]
        .to_vec()
    }
}

/// Hashes (field -> value maps).
pub mod hash {
    use super::{tags, Tag};

    redop_core::capabilities! {
        pub Get = "get",
        pub Put = "put",
        pub Delete = "delete",
        pub Keys = "keys",
        pub Values = "values",
        pub Entries = "entries",
        pub IfAbsent = "if-absent",
        pub Increment = "increment",
        pub Size = "size",
        pub Exists = "exists",
        pub Field = "field",
        pub Fields = "fields",
        pub Value = "value",
        pub Delta = "delta",
        pub Scan = "scan",
    }

    #[must_use]
    pub fn all() -> Vec<Tag> {
        tags![
            Get, Put, Delete, Keys, Values, Entries, IfAbsent, Increment, Size, Exists, Field,
            Fields, Value, Delta, Scan,
        ]
        .to_vec()
    }
}

/// Unordered sets.
pub mod set {
    use super::{tags, Tag};

    redop_core::capabilities! {
        pub Add = "add",
        pub Remove = "remove",
        pub Members = "members",
        pub IsMember = "is-member",
        pub Pop = "pop",
        pub Random = "random",
        pub Size = "size",
        pub Count = "count",
        pub Member = "member",
        pub Scan = "scan",
    }

    #[must_use]
    pub fn all() -> Vec<Tag> {
        tags![Add, Remove, Members, IsMember, Pop, Random, Size, Count, Member, Scan].to_vec()
    }
}

/// Sorted sets.
pub mod sorted_set {
    use super::{tags, Tag};

    redop_core::capabilities! {
        pub Add = "add",
        pub Remove = "remove",
        pub Range = "range",
        pub ByScore = "by-score",
        pub ByLex = "by-lex",
        pub Rank = "rank",
        pub Score = "score",
        pub Increment = "increment",
        pub WithScores = "with-scores",
        pub Reverse = "reverse",
        pub Paged = "paged",
        pub Count = "count",
        pub IfAbsent = "if-absent",
        pub Size = "size",
        pub Pop = "pop",
        pub Min = "min",
        pub Max = "max",
        pub Member = "member",
        pub Offset = "offset",
    }

    #[must_use]
    pub fn all() -> Vec<Tag> {
        tags![
            Add, Remove, Range, ByScore, ByLex, Rank, Score, Increment, WithScores, Reverse,
            Paged, Count, IfAbsent, Size, Pop, Min, Max, Member, Offset,
        ]
        .to_vec()
    }
}

/// Lists.
pub mod list {
    use super::{tags, Tag};

    redop_core::capabilities! {
        pub Push = "push",
        pub Pop = "pop",
        pub Left = "left",
        pub Right = "right",
        pub Range = "range",
        pub Index = "index",
        pub Set = "set",
        pub Trim = "trim",
        pub Remove = "remove",
        pub Size = "size",
        pub Blocking = "blocking",
        pub IfPresent = "if-present",
        pub Value = "value",
        pub Count = "count",
        pub Start = "start",
        pub End = "end",
    }

    #[must_use]
    pub fn all() -> Vec<Tag> {
        tags![
            Push, Pop, Left, Right, Range, Index, Set, Trim, Remove, Size, Blocking, IfPresent,
            Value, Count, Start, End,
        ]
        .to_vec()
    }
}

/// Geospatial indexes.
pub mod geo {
    use super::{tags, Tag};

    redop_core::capabilities! {
        pub Add = "add",
        pub Position = "position",
        pub Distance = "distance",
        pub Radius = "radius",
        pub GeoHash = "geo-hash",
        pub Remove = "remove",
        pub WithCoordinates = "with-coordinates",
        pub WithDistance = "with-distance",
        pub Count = "count",
        pub Ascending = "ascending",
        pub Descending = "descending",
        pub Member = "member",
        pub Longitude = "longitude",
        pub Latitude = "latitude",
        pub Unit = "unit",
    }

    #[must_use]
    pub fn all() -> Vec<Tag> {
        tags![
            Add, Position, Distance, Radius, GeoHash, Remove, WithCoordinates, WithDistance,
            Count, Ascending, Descending, Member, Longitude, Latitude, Unit,
        ]
        .to_vec()
    }
}

/// Operations spanning several set keys.
pub mod cross_set {
    use super::{tags, Tag};

    redop_core::capabilities! {
        pub Union = "union",
        pub Intersect = "intersect",
        pub Difference = "difference",
        pub Store = "store",
        pub Move = "move",
        pub OtherKeys = "other-keys",
        pub Destination = "destination",
        pub Member = "member",
    }

    #[must_use]
    pub fn all() -> Vec<Tag> {
        tags![Union, Intersect, Difference, Store, Move, OtherKeys, Destination, Member].to_vec()
    }
}

/// Operations spanning several sorted-set keys.
pub mod cross_sorted_set {
    use super::{tags, Tag};

    redop_core::capabilities! {
        pub Union = "union",
        pub Intersect = "intersect",
        pub Difference = "difference",
        pub Store = "store",
        pub WithScores = "with-scores",
        pub Weights = "weights",
        pub Aggregate = "aggregate",
        pub OtherKeys = "other-keys",
        pub Destination = "destination",
    }

    #[must_use]
    pub fn all() -> Vec<Tag> {
        tags![
            Union, Intersect, Difference, Store, WithScores, Weights, Aggregate, OtherKeys,
            Destination,
        ]
        .to_vec()
    }
}

/// Operations moving elements between list keys.
pub mod cross_list {
    use super::{tags, Tag};

    redop_core::capabilities! {
        pub PopPush = "pop-push",
        pub Move = "move",
        pub Blocking = "blocking",
        pub FromLeft = "from-left",
        pub FromRight = "from-right",
        pub ToLeft = "to-left",
        pub ToRight = "to-right",
        pub Destination = "destination",
    }

    #[must_use]
    pub fn all() -> Vec<Tag> {
        tags![PopPush, Move, Blocking, FromLeft, FromRight, ToLeft, ToRight, Destination].to_vec()
    }
}

/// Server-side scripts.
pub mod script {
    use super::{tags, Tag};

    redop_core::capabilities! {
        pub Eval = "eval",
        pub BySha = "by-sha",
        pub Load = "load",
        pub Keys = "keys",
        pub Args = "args",
        pub ReadOnly = "read-only",
        pub Source = "source",
    }

    #[must_use]
    pub fn all() -> Vec<Tag> {
        tags![Eval, BySha, Load, Keys, Args, ReadOnly, Source].to_vec()
    }
}

/// MULTI/EXEC transactions.
pub mod transaction {
    use super::{tags, Tag};

    redop_core::capabilities! {
        pub Multi = "multi",
        pub Exec = "exec",
        pub Discard = "discard",
        pub Watch = "watch",
        pub Unwatch = "unwatch",
        pub Keys = "keys",
    }

    #[must_use]
    pub fn all() -> Vec<Tag> {
        tags![Multi, Exec, Discard, Watch, Unwatch, Keys].to_vec()
    }
}

/// Locks over several keys at once.
pub mod multi_lock {
    use super::{tags, Tag};

    redop_core::capabilities! {
        pub Lock = "lock",
        pub TryLock = "try-lock",
        pub Unlock = "unlock",
        pub Lease = "lease",
        pub Wait = "wait",
        pub Fair = "fair",
        pub Keys = "keys",
        pub Owner = "owner",
    }

    #[must_use]
    pub fn all() -> Vec<Tag> {
        tags![Lock, TryLock, Unlock, Lease, Wait, Fair, Keys, Owner].to_vec()
    }
}
