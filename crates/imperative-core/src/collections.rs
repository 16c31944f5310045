//! Collection aliases shared across the workspace.
//!
//! The `std-hash` feature swaps the hashers for the standard library ones,
//! which keeps iteration-independent tests reproducible under a debugger.

#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::{HashMap, HashSet};

    pub type OrderedMap<K, V> = indexmap::IndexMap<K, V, std::collections::hash_map::RandomState>;
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub use hashbrown::{HashMap, HashSet};

    pub type OrderedMap<K, V> = indexmap::IndexMap<K, V, ahash::RandomState>;
}

pub use map::OrderedMap;
