#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// A hash map with densely stored entries.
///
/// This module provides a `DenseMap` that wraps the `DenseTable` and
/// provides a standard key-value map interface with configurable hashers.
pub mod dense_map;

/// A hash set with densely stored entries.
///
/// This module provides a `DenseSet` that wraps the `DenseTable` and
/// provides a standard set interface with configurable hashers.
pub mod dense_set;

pub mod dense_table;

/// Hash finalization and the default hasher.
pub mod hash;

#[cfg(all(test, feature = "std"))]
mod proptests;

pub use dense_map::DenseMap;
pub use dense_map::Entry;
pub use dense_set::DenseSet;
pub use dense_table::DenseTable;
pub use hash::DefaultHashBuilder;
pub use hash::MixHash;
