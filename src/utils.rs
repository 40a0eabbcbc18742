//! Utilities for the whole crate
//!
//! This module contains:
//! - The shared string type used for asset keys
//! - An unified API for `HashMap`s between `std` and `ahash` hashers

use std::sync::Arc;

/// The string type used to identify assets.
///
/// Keys travel between the registry, the dependency table and in-flight
/// tasks, so they are reference-counted rather than copied.
pub type SharedString = Arc<str>;

#[cfg(feature = "ahash")]
pub(crate) use ahash::RandomState;

#[cfg(not(feature = "ahash"))]
pub(crate) use std::collections::hash_map::RandomState;

pub(crate) type HashMap<K, V> = std::collections::HashMap<K, V, RandomState>;
pub(crate) type HashSet<T> = std::collections::HashSet<T, RandomState>;
