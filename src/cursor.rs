//! Views over a map and the iterators that may remove from it.
//!
//! A view borrows the map mutably and exposes one aspect of it: its keys
//! ([`KeySet`]), its values ([`ValueCollection`]), or its entries
//! ([`EntrySet`]). Their iterators can remove the entry they last returned.
//! Such removals shift later entries back exactly as [`PrimitiveHashMap::remove`]
//! does, but never shrink the table, and every entry present when the iterator
//! was created is still returned exactly once.
//!
//! Two entry iterators exist. [`EntryIter`] yields owned copies. [`FastEntryIter`]
//! hands out an [`EntryRef`] that borrows the iterator, so it cannot outlive the
//! next call to [`FastEntryIter::next_entry`].

use core::iter::FusedIterator;

use crate::error::IterError;
use crate::hash_map::PrimitiveHashMap;
use crate::hash_table::RawCursor;
use crate::key::Key;

impl<K, V> PrimitiveHashMap<K, V>
where
    K: Key,
    V: Default,
{
    /// Returns a view of the map's keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::PrimitiveHashMap;
    ///
    /// let mut map: PrimitiveHashMap<u32, u32> = (1..=10).map(|k| (k, k * k)).collect();
    ///
    /// let mut keys = map.key_set();
    /// assert!(keys.contains(&3));
    ///
    /// let mut iter = keys.iter();
    /// while let Some(key) = iter.next() {
    ///     if key % 2 == 0 {
    ///         iter.remove()?;
    ///     }
    /// }
    /// assert_eq!(map.len(), 5);
    /// assert!(!map.contains_key(&4));
    /// # Ok::<(), prim_hash::IterError>(())
    /// ```
    pub fn key_set(&mut self) -> KeySet<'_, K, V> {
        KeySet { map: self }
    }

    /// Returns a view of the map's values.
    pub fn value_collection(&mut self) -> ValueCollection<'_, K, V> {
        ValueCollection { map: self }
    }

    /// Returns a view of the map's entries.
    pub fn entry_set(&mut self) -> EntrySet<'_, K, V> {
        EntrySet { map: self }
    }

    /// Removes every entry, returning them in iteration order.
    ///
    /// Entries not consumed before the iterator is dropped are removed anyway.
    /// The table keeps its size.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            cursor: RawCursor::new(&self.table),
            map: self,
        }
    }
}

/// The keys of a [`PrimitiveHashMap`].
///
/// Created by [`PrimitiveHashMap::key_set`].
pub struct KeySet<'a, K, V> {
    map: &'a mut PrimitiveHashMap<K, V>,
}

impl<'a, K, V> KeySet<'a, K, V>
where
    K: Key,
    V: Default,
{
    /// Number of keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if there are no keys.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` if `key` is in the map.
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Removes `key` and its value, returning whether it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        self.map.remove_entry(key).is_some()
    }

    /// Removes every entry from the map.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Iterates over the keys, allowing removal of the current one.
    pub fn iter(&mut self) -> KeyIter<'_, K, V> {
        KeyIter {
            cursor: RawCursor::new(&self.map.table),
            map: &mut *self.map,
        }
    }
}

impl<'a, K, V> IntoIterator for KeySet<'a, K, V>
where
    K: Key,
    V: Default,
{
    type IntoIter = KeyIter<'a, K, V>;
    type Item = K;

    fn into_iter(self) -> Self::IntoIter {
        KeyIter {
            cursor: RawCursor::new(&self.map.table),
            map: self.map,
        }
    }
}

/// The values of a [`PrimitiveHashMap`].
///
/// Created by [`PrimitiveHashMap::value_collection`].
pub struct ValueCollection<'a, K, V> {
    map: &'a mut PrimitiveHashMap<K, V>,
}

impl<'a, K, V> ValueCollection<'a, K, V>
where
    K: Key,
    V: Default,
{
    /// Number of values, counting duplicates.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if there are no values.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` if any entry has this value.
    pub fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.map.contains_value(value)
    }

    /// Removes every entry from the map.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Iterates over the values, allowing removal of the current entry.
    pub fn iter(&mut self) -> ValueIter<'_, K, V> {
        ValueIter {
            cursor: RawCursor::new(&self.map.table),
            map: &mut *self.map,
        }
    }
}

impl<'a, K, V> IntoIterator for ValueCollection<'a, K, V>
where
    K: Key,
    V: Default + Clone,
{
    type IntoIter = ValueIter<'a, K, V>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        ValueIter {
            cursor: RawCursor::new(&self.map.table),
            map: self.map,
        }
    }
}

/// The entries of a [`PrimitiveHashMap`].
///
/// Created by [`PrimitiveHashMap::entry_set`].
pub struct EntrySet<'a, K, V> {
    map: &'a mut PrimitiveHashMap<K, V>,
}

impl<'a, K, V> EntrySet<'a, K, V>
where
    K: Key,
    V: Default,
{
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` if `key` maps to `value`.
    pub fn contains(&self, key: &K, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.map.find(key).is_some_and(|v| v == value)
    }

    /// Removes the entry if `key` maps to `value`.
    pub fn remove(&mut self, key: &K, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.map.remove_if_equals(key, value)
    }

    /// Removes every entry from the map.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Iterates over owned copies of the entries.
    pub fn iter(&mut self) -> EntryIter<'_, K, V> {
        EntryIter {
            cursor: RawCursor::new(&self.map.table),
            map: &mut *self.map,
        }
    }

    /// Iterates over the entries in place without copying them.
    pub fn fast_iter(&mut self) -> FastEntryIter<'_, K, V> {
        FastEntryIter {
            cursor: RawCursor::new(&self.map.table),
            map: &mut *self.map,
        }
    }
}

impl<'a, K, V> IntoIterator for EntrySet<'a, K, V>
where
    K: Key,
    V: Default + Clone,
{
    type IntoIter = EntryIter<'a, K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        EntryIter {
            cursor: RawCursor::new(&self.map.table),
            map: self.map,
        }
    }
}

/// An iterator over the keys of a map that can remove the current entry.
pub struct KeyIter<'a, K, V> {
    map: &'a mut PrimitiveHashMap<K, V>,
    cursor: RawCursor<K>,
}

impl<K, V> KeyIter<'_, K, V>
where
    K: Key,
    V: Default,
{
    /// Removes the entry whose key was returned last.
    ///
    /// # Errors
    ///
    /// Fails if nothing has been returned yet, the entry was already removed,
    /// or the iterator is exhausted.
    pub fn remove(&mut self) -> Result<(), IterError> {
        self.cursor.remove(&mut self.map.table).map(drop)
    }
}

impl<K, V> Iterator for KeyIter<'_, K, V>
where
    K: Key,
    V: Default,
{
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor.next_slot(&self.map.table)?;
        Some(self.map.table.key_at(slot).clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.remaining();
        (remaining, Some(remaining))
    }
}

impl<K: Key, V: Default> ExactSizeIterator for KeyIter<'_, K, V> {}
impl<K: Key, V: Default> FusedIterator for KeyIter<'_, K, V> {}

/// An iterator over the values of a map that can remove the current entry.
pub struct ValueIter<'a, K, V> {
    map: &'a mut PrimitiveHashMap<K, V>,
    cursor: RawCursor<K>,
}

impl<K, V> ValueIter<'_, K, V>
where
    K: Key,
    V: Default,
{
    /// Removes the entry whose value was returned last.
    ///
    /// # Errors
    ///
    /// See [`KeyIter::remove`].
    pub fn remove(&mut self) -> Result<(), IterError> {
        self.cursor.remove(&mut self.map.table).map(drop)
    }

    /// Replaces the value returned last, returning the old one.
    pub fn set_value(&mut self, value: V) -> Result<V, IterError> {
        self.cursor.set_value(&mut self.map.table, value)
    }
}

impl<K, V> Iterator for ValueIter<'_, K, V>
where
    K: Key,
    V: Default + Clone,
{
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor.next_slot(&self.map.table)?;
        Some(self.map.table.value_at(slot).clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.remaining();
        (remaining, Some(remaining))
    }
}

impl<K: Key, V: Default + Clone> ExactSizeIterator for ValueIter<'_, K, V> {}
impl<K: Key, V: Default + Clone> FusedIterator for ValueIter<'_, K, V> {}

/// An iterator over owned copies of a map's entries that can remove the
/// current entry.
pub struct EntryIter<'a, K, V> {
    map: &'a mut PrimitiveHashMap<K, V>,
    cursor: RawCursor<K>,
}

impl<K, V> EntryIter<'_, K, V>
where
    K: Key,
    V: Default,
{
    /// Removes the entry returned last.
    ///
    /// # Errors
    ///
    /// See [`KeyIter::remove`].
    pub fn remove(&mut self) -> Result<(), IterError> {
        self.cursor.remove(&mut self.map.table).map(drop)
    }

    /// Replaces the value of the entry returned last, returning the old one.
    /// The copy already returned is not affected.
    pub fn set_value(&mut self, value: V) -> Result<V, IterError> {
        self.cursor.set_value(&mut self.map.table, value)
    }
}

impl<K, V> Iterator for EntryIter<'_, K, V>
where
    K: Key,
    V: Default + Clone,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor.next_slot(&self.map.table)?;
        let table = &self.map.table;
        Some((table.key_at(slot).clone(), table.value_at(slot).clone()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.remaining();
        (remaining, Some(remaining))
    }
}

impl<K: Key, V: Default + Clone> ExactSizeIterator for EntryIter<'_, K, V> {}
impl<K: Key, V: Default + Clone> FusedIterator for EntryIter<'_, K, V> {}

/// An iterator over a map's entries that lends each one in place.
///
/// This is not an [`Iterator`]: the [`EntryRef`] returned by
/// [`next_entry`](FastEntryIter::next_entry) borrows the iterator, so it must
/// be dropped before advancing or removing.
///
/// # Examples
///
/// ```rust
/// use prim_hash::PrimitiveHashMap;
///
/// let mut map: PrimitiveHashMap<i32, i32> = (-5..=5).map(|k| (k, k)).collect();
///
/// let mut entries = map.entry_set();
/// let mut iter = entries.fast_iter();
/// while let Some(mut entry) = iter.next_entry() {
///     if *entry.key() < 0 {
///         drop(entry);
///         iter.remove()?;
///     } else {
///         *entry.value_mut() *= 10;
///     }
/// }
///
/// assert_eq!(map.len(), 6);
/// assert_eq!(map.get(&5), 50);
/// # Ok::<(), prim_hash::IterError>(())
/// ```
pub struct FastEntryIter<'a, K, V> {
    map: &'a mut PrimitiveHashMap<K, V>,
    cursor: RawCursor<K>,
}

impl<K, V> FastEntryIter<'_, K, V>
where
    K: Key,
    V: Default,
{
    /// Advances to the next entry.
    pub fn next_entry(&mut self) -> Option<EntryRef<'_, K, V>> {
        let slot = self.cursor.next_slot(&self.map.table)?;
        let (key, value) = self.map.table.entry_at_mut(slot);
        Some(EntryRef { key, value })
    }

    /// Removes the entry returned last.
    ///
    /// # Errors
    ///
    /// See [`KeyIter::remove`].
    pub fn remove(&mut self) -> Result<(), IterError> {
        self.cursor.remove(&mut self.map.table).map(drop)
    }

    /// Number of entries not yet returned.
    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }
}

/// An entry lent by [`FastEntryIter`].
pub struct EntryRef<'a, K, V> {
    key: &'a K,
    value: &'a mut V,
}

impl<K, V> EntryRef<'_, K, V> {
    /// The entry's key.
    pub fn key(&self) -> &K {
        self.key
    }

    /// The entry's value.
    pub fn value(&self) -> &V {
        self.value
    }

    /// The entry's value, writable in place.
    pub fn value_mut(&mut self) -> &mut V {
        self.value
    }

    /// Replaces the value, returning the old one.
    pub fn set_value(&mut self, value: V) -> V {
        core::mem::replace(self.value, value)
    }
}

/// A draining iterator over the entries of a [`PrimitiveHashMap`].
///
/// Created by [`PrimitiveHashMap::drain`].
pub struct Drain<'a, K, V>
where
    K: Key,
    V: Default,
{
    map: &'a mut PrimitiveHashMap<K, V>,
    cursor: RawCursor<K>,
}

impl<K, V> Iterator for Drain<'_, K, V>
where
    K: Key,
    V: Default,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_slot(&self.map.table)?;
        self.cursor.remove(&mut self.map.table).ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.remaining();
        (remaining, Some(remaining))
    }
}

impl<K: Key, V: Default> ExactSizeIterator for Drain<'_, K, V> {}
impl<K: Key, V: Default> FusedIterator for Drain<'_, K, V> {}

impl<K, V> Drop for Drain<'_, K, V>
where
    K: Key,
    V: Default,
{
    fn drop(&mut self) {
        self.map.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::key::mix;

    /// Keys whose home slot is the last slot of a table with `n` slots, so
    /// that their cluster wraps around to the start of the table.
    fn keys_homed_at_end(n: usize, count: usize) -> Vec<u64> {
        (1u64..)
            .filter(|&key| (mix(key) as usize) & (n - 1) == n - 1)
            .take(count)
            .collect()
    }

    fn wrapping_map() -> PrimitiveHashMap<u64, u64> {
        let mut map = PrimitiveHashMap::with_capacity(40);
        let n = map.table_size();
        for key in keys_homed_at_end(n, 6) {
            map.insert(key, key + 1);
        }
        for key in 500..530 {
            map.insert(key, key + 1);
        }
        map.insert(0, 1);
        assert_eq!(map.table_size(), n);
        map
    }

    #[test]
    fn test_views_delegate_to_map() {
        let mut map: PrimitiveHashMap<u32, u32> = (1..=4).map(|k| (k, k * 10)).collect();

        let mut keys = map.key_set();
        assert_eq!(keys.len(), 4);
        assert!(keys.contains(&2));
        assert!(keys.remove(&2));
        assert!(!keys.remove(&2));
        assert!(!keys.is_empty());

        let values = map.value_collection();
        assert_eq!(values.len(), 3);
        assert!(values.contains(&30));
        assert!(!values.contains(&20));

        let mut entries = map.entry_set();
        assert!(entries.contains(&3, &30));
        assert!(!entries.contains(&3, &31));
        assert!(!entries.remove(&3, &31));
        assert!(entries.remove(&3, &30));
        assert_eq!(entries.len(), 2);
        entries.clear();
        assert!(entries.is_empty());
        assert!(map.is_empty());
    }

    #[test]
    fn test_key_iter_removes_everything() {
        let mut map = wrapping_map();
        let expected: HashSet<u64> = map.keys().copied().collect();
        let size = map.table_size();

        let mut keys = map.key_set();
        let mut iter = keys.iter();
        let mut seen = HashSet::new();
        while let Some(key) = iter.next() {
            assert!(seen.insert(key), "key {key} returned twice");
            iter.remove().unwrap();
        }
        assert_eq!(iter.remove(), Err(IterError::Exhausted));

        assert_eq!(seen, expected);
        assert!(map.is_empty());
        assert_eq!(map.table_size(), size);
    }

    #[test]
    fn test_entry_iter_partial_removal() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..25 {
            let mut map = wrapping_map();
            let expected: HashSet<(u64, u64)> = map.iter().map(|(k, v)| (*k, *v)).collect();

            let mut kept = HashSet::new();
            let mut seen = HashSet::new();
            let mut entries = map.entry_set();
            let mut iter = entries.iter();
            while let Some((key, value)) = iter.next() {
                assert!(seen.insert((key, value)));
                if rng.random_bool(0.5) {
                    iter.remove().unwrap();
                } else {
                    kept.insert(key);
                }
            }

            assert_eq!(seen, expected);
            let remaining: HashSet<u64> = map.keys().copied().collect();
            assert_eq!(remaining, kept);
            for key in &kept {
                assert_eq!(map.get(key), key + 1);
            }
        }
    }

    #[test]
    fn test_iterator_protocol_errors() {
        let mut map: PrimitiveHashMap<u8, u8> = [(1, 1), (2, 2)].into_iter().collect();
        let mut entries = map.entry_set();
        let mut iter = entries.iter();

        assert_eq!(iter.remove(), Err(IterError::NotStarted));
        assert_eq!(iter.set_value(9), Err(IterError::NotStarted));

        let (key, value) = iter.next().unwrap();
        assert_eq!(key, value);
        assert_eq!(iter.set_value(9), Ok(value));
        iter.remove().unwrap();
        assert_eq!(iter.remove(), Err(IterError::AlreadyRemoved));
        assert_eq!(iter.set_value(1), Err(IterError::AlreadyRemoved));

        assert!(iter.next().is_some());
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
        assert_eq!(iter.remove(), Err(IterError::Exhausted));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_value_iter_set_value() {
        let mut map: PrimitiveHashMap<i16, f32> = (1..=20).map(|k| (k, f32::from(k))).collect();
        let mut values = map.value_collection();
        let mut iter = values.iter();
        while let Some(value) = iter.next() {
            if value > 10.0 {
                iter.remove().unwrap();
            } else {
                iter.set_value(-value).unwrap();
            }
        }

        assert_eq!(map.len(), 10);
        assert!(map.values().all(|v| *v < 0.0));
    }

    #[test]
    fn test_fast_iter_edits_in_place() {
        let mut map = wrapping_map();
        let expected = map.len();

        let mut entries = map.entry_set();
        let mut iter = entries.fast_iter();
        let mut visited = 0;
        while let Some(mut entry) = iter.next_entry() {
            visited += 1;
            let key = *entry.key();
            assert_eq!(*entry.value(), key + 1);
            if key % 2 == 0 {
                drop(entry);
                iter.remove().unwrap();
            } else {
                assert_eq!(entry.set_value(key), key + 1);
            }
        }
        assert_eq!(visited, expected);
        assert_eq!(iter.remaining(), 0);

        assert!(map.iter().all(|(k, v)| k == v && k % 2 == 1));
    }

    #[test]
    fn test_into_iter_views() {
        let mut map: PrimitiveHashMap<u16, u16> = (0..8).map(|k| (k, k + 100)).collect();

        let mut keys: Vec<u16> = map.key_set().into_iter().collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..8).collect::<Vec<_>>());

        let total: u16 = map.value_collection().into_iter().sum();
        assert_eq!(total, (100..108).sum());

        let entries: HashSet<(u16, u16)> = map.entry_set().into_iter().collect();
        assert_eq!(entries.len(), 8);
        assert!(entries.contains(&(0, 100)));
    }

    #[test]
    fn test_drain() {
        let mut map = wrapping_map();
        let expected: HashSet<(u64, u64)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        let size = map.table_size();

        let drained: HashSet<(u64, u64)> = map.drain().collect();
        assert_eq!(drained, expected);
        assert!(map.is_empty());
        assert_eq!(map.table_size(), size);

        map.insert(1, 1);
        map.insert(2, 2);
        let mut drain = map.drain();
        assert_eq!(drain.len(), 2);
        drain.next();
        drop(drain);
        assert!(map.is_empty());
        assert!(!map.contains_key(&1) && !map.contains_key(&2));
    }
}
