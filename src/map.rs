//! The map type backing [`Values`](crate::Values) and [`Value`](crate::Value).
//!
//! Keys are kept sorted by default. With the `indexmap` feature enabled they
//! keep their insertion order instead.

#[cfg(feature = "indexmap")]
pub use indexmap::IndexMap as Map;
#[cfg(not(feature = "indexmap"))]
pub use std::collections::BTreeMap as Map;

pub(crate) fn remove<V>(map: &mut Map<String, V>, key: &str) -> Option<V> {
    #[cfg(feature = "indexmap")]
    {
        map.shift_remove(key)
    }
    #[cfg(not(feature = "indexmap"))]
    {
        map.remove(key)
    }
}
