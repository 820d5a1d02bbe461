use core::alloc::Layout;

use thiserror::Error;

/// Errors raised while building or growing a table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The load factor was not in `(0, 1]`.
    #[error("load factor must be greater than 0 and at most 1, got {0}")]
    InvalidLoadFactor(f32),

    /// Parallel key and value arrays had different lengths.
    #[error("key and value arrays have different lengths ({keys} keys, {values} values)")]
    LengthMismatch {
        /// Number of keys supplied.
        keys: usize,
        /// Number of values supplied.
        values: usize,
    },

    /// The requested number of entries cannot be backed by any table size.
    #[error("a table for {requested} entries exceeds the maximum table size")]
    CapacityOverflow {
        /// The entry count (or slot count) that was requested.
        requested: usize,
    },

    /// The allocator could not provide storage for a new table.
    #[error("failed to allocate {} bytes of table storage", .layout.size())]
    Alloc {
        /// Layout of the allocation that failed.
        layout: Layout,
    },
}

/// Misuse of a removal-capable iterator.
///
/// These are logic errors in the caller and are reported separately from
/// [`Error`], which only covers construction and allocation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterError {
    /// `remove` or `set_value` was called before the first call to `next`.
    #[error("no entry has been returned yet")]
    NotStarted,

    /// The current entry was already removed.
    #[error("the current entry has already been removed")]
    AlreadyRemoved,

    /// The iterator has returned `None`; there is no current entry.
    #[error("the iterator is exhausted")]
    Exhausted,
}

/// Reports a failed growth on an infallible path.
#[cold]
#[inline(never)]
pub(crate) fn growth_failed(err: Error) -> ! {
    match err {
        Error::Alloc { layout } => alloc::alloc::handle_alloc_error(layout),
        other => panic!("{other}"),
    }
}
