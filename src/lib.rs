#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// A map from primitive keys to values, stored unboxed in parallel arrays.
///
/// This module provides [`PrimitiveHashMap`], its entry API, and its read-only
/// and owning iterators.
pub mod hash_map;

pub mod cursor;

/// A set of primitive keys, backed by a [`PrimitiveHashMap`] with unit
/// values.
pub mod hash_set;

pub mod compat;
mod error;
mod hash_table;
pub mod key;
#[cfg(feature = "serde")]
mod serde;
#[cfg(feature = "sync")]
pub mod sync;

pub use compat::GenericMap;
pub use cursor::EntryRef;
pub use error::Error;
pub use error::IterError;
pub use hash_map::Entry;
pub use hash_map::PrimitiveHashMap;
pub use hash_set::PrimitiveHashSet;
pub use hash_table::DEFAULT_INITIAL_SIZE;
pub use hash_table::DEFAULT_LOAD_FACTOR;
pub use hash_table::FAST_LOAD_FACTOR;
#[cfg(feature = "stats")]
pub use hash_table::ProbeStats;
pub use hash_table::VERY_FAST_LOAD_FACTOR;
pub use key::Key;
#[cfg(feature = "sync")]
pub use sync::SyncPrimitiveHashMap;
