//! A map shared between threads behind one lock.

use parking_lot::Mutex;
use parking_lot::MutexGuard;

use crate::error::Error;
use crate::hash_map::PrimitiveHashMap;
use crate::key::Key;

/// A [`PrimitiveHashMap`] behind a single [`parking_lot::Mutex`].
///
/// Every method takes the lock for its whole duration. Compound operations,
/// views, and iteration should go through [`lock`] or [`with`] so that they
/// run under one acquisition and observe a consistent map.
///
/// [`lock`]: SyncPrimitiveHashMap::lock
/// [`with`]: SyncPrimitiveHashMap::with
///
/// # Examples
///
/// ```rust
/// use prim_hash::SyncPrimitiveHashMap;
///
/// let hits: SyncPrimitiveHashMap<u16, u64> = SyncPrimitiveHashMap::new();
/// std::thread::scope(|s| {
///     for _ in 0..4 {
///         s.spawn(|| {
///             for port in [80, 443, 80] {
///                 hits.add_to(port, 1);
///             }
///         });
///     }
/// });
/// assert_eq!(hits.get(&80), 8);
///
/// let busiest = hits.with(|map| map.iter().max_by_key(|(_, n)| **n).map(|(p, _)| *p));
/// assert_eq!(busiest, Some(80));
/// ```
pub struct SyncPrimitiveHashMap<K, V> {
    inner: Mutex<PrimitiveHashMap<K, V>>,
}

impl<K, V> SyncPrimitiveHashMap<K, V>
where
    K: Key,
    V: Default,
{
    /// Creates an empty map with the default expected size and load factor.
    pub fn new() -> Self {
        Self::from_map(PrimitiveHashMap::new())
    }

    /// Creates an empty map that holds `expected` entries at the given load
    /// factor without growing.
    ///
    /// # Errors
    ///
    /// See [`PrimitiveHashMap::with_capacity_and_load_factor`].
    pub fn with_capacity_and_load_factor(expected: usize, load_factor: f32) -> Result<Self, Error> {
        PrimitiveHashMap::with_capacity_and_load_factor(expected, load_factor).map(Self::from_map)
    }

    /// Wraps an existing map.
    pub fn from_map(map: PrimitiveHashMap<K, V>) -> Self {
        Self {
            inner: Mutex::new(map),
        }
    }

    /// Takes the lock, returning a guard that dereferences to the map.
    pub fn lock(&self) -> MutexGuard<'_, PrimitiveHashMap<K, V>> {
        self.inner.lock()
    }

    /// Runs `f` on the map under one acquisition of the lock.
    pub fn with<R>(&self, f: impl FnOnce(&mut PrimitiveHashMap<K, V>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Borrows the map without locking, which `&mut self` makes safe.
    pub fn get_mut(&mut self) -> &mut PrimitiveHashMap<K, V> {
        self.inner.get_mut()
    }

    /// Unwraps the map.
    pub fn into_inner(self) -> PrimitiveHashMap<K, V> {
        self.inner.into_inner()
    }

    /// See [`PrimitiveHashMap::len`].
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// See [`PrimitiveHashMap::is_empty`].
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// See [`PrimitiveHashMap::get`].
    pub fn get(&self, key: &K) -> V
    where
        V: Clone,
    {
        self.inner.lock().get(key)
    }

    /// See [`PrimitiveHashMap::contains_key`].
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.lock().contains_key(key)
    }

    /// See [`PrimitiveHashMap::insert`].
    pub fn insert(&self, key: K, value: V) -> V
    where
        V: Clone,
    {
        self.inner.lock().insert(key, value)
    }

    /// See [`PrimitiveHashMap::remove`].
    pub fn remove(&self, key: &K) -> V
    where
        V: Clone,
    {
        self.inner.lock().remove(key)
    }

    /// See [`PrimitiveHashMap::add_to`].
    pub fn add_to(&self, key: K, increment: V) -> V
    where
        V: core::ops::Add<Output = V> + Clone,
    {
        self.inner.lock().add_to(key, increment)
    }

    /// See [`PrimitiveHashMap::clear`].
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// See [`PrimitiveHashMap::trim`].
    pub fn trim(&self) -> bool {
        self.inner.lock().trim()
    }
}

impl<K, V> Default for SyncPrimitiveHashMap<K, V>
where
    K: Key,
    V: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> From<PrimitiveHashMap<K, V>> for SyncPrimitiveHashMap<K, V>
where
    K: Key,
    V: Default,
{
    fn from(map: PrimitiveHashMap<K, V>) -> Self {
        Self::from_map(map)
    }
}
