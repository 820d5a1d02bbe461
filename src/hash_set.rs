use core::fmt::Debug;
use core::iter::Chain;
use core::iter::FusedIterator;

use crate::cursor;
use crate::error::Error;
use crate::hash_map;
use crate::hash_map::PrimitiveHashMap;
use crate::key::Key;

/// An open-addressing hash set of primitive keys.
///
/// `PrimitiveHashSet<K>` is a [`PrimitiveHashMap<K, ()>`], so it shares the
/// map's layout, growth and shrink policy, and iteration order.
///
/// [`PrimitiveHashMap<K, ()>`]: PrimitiveHashMap
#[derive(Clone)]
pub struct PrimitiveHashSet<K> {
    map: PrimitiveHashMap<K, ()>,
}

impl<K: Key> PartialEq for PrimitiveHashSet<K> {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|k| other.contains(k))
    }
}

impl<K> Debug for PrimitiveHashSet<K>
where
    K: Key + Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: Key> PrimitiveHashSet<K> {
    /// Creates an empty set with the default expected size and load factor.
    pub fn new() -> Self {
        Self {
            map: PrimitiveHashMap::new(),
        }
    }

    /// Creates an empty set that holds `expected` keys without growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::PrimitiveHashSet;
    ///
    /// let set: PrimitiveHashSet<char> = PrimitiveHashSet::with_capacity(100);
    /// assert!(set.capacity() >= 100);
    /// ```
    pub fn with_capacity(expected: usize) -> Self {
        Self {
            map: PrimitiveHashMap::with_capacity(expected),
        }
    }

    /// Creates an empty set that holds `expected` keys at the given load
    /// factor without growing.
    ///
    /// # Errors
    ///
    /// Fails if `load_factor` is not in `(0, 1]`, or if the table cannot be
    /// sized or allocated.
    pub fn with_capacity_and_load_factor(expected: usize, load_factor: f32) -> Result<Self, Error> {
        Ok(Self {
            map: PrimitiveHashMap::with_capacity_and_load_factor(expected, load_factor)?,
        })
    }

    /// Returns the number of keys in the set.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set contains no keys.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of keys the set can hold before it grows.
    pub fn capacity(&self) -> usize {
        self.map.capacity()
    }

    /// Returns the number of probe slots in the table.
    pub fn table_size(&self) -> usize {
        self.map.table_size()
    }

    /// Removes every key, keeping the table size.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Shrinks the table to the smallest size that holds the current keys.
    /// Returns `false` if the smaller table cannot be allocated.
    pub fn trim(&mut self) -> bool {
        self.map.trim()
    }

    /// Reserves room for at least `additional` more keys.
    pub fn reserve(&mut self, additional: usize) {
        self.map.reserve(additional);
    }

    /// Fallible [`reserve`](PrimitiveHashSet::reserve).
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.map.try_reserve(additional)
    }

    /// Adds a key, returning `true` if it was not already present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::PrimitiveHashSet;
    ///
    /// let mut set = PrimitiveHashSet::new();
    /// assert!(set.insert(0i32));
    /// assert!(set.insert(-1));
    /// assert!(!set.insert(0));
    /// assert_eq!(set.len(), 2);
    /// ```
    pub fn insert(&mut self, key: K) -> bool {
        match self.map.entry(key) {
            hash_map::Entry::Vacant(entry) => {
                entry.insert(());
                true
            }
            hash_map::Entry::Occupied(_) => false,
        }
    }

    /// Fallible [`insert`](PrimitiveHashSet::insert).
    pub fn try_insert(&mut self, key: K) -> Result<bool, Error> {
        Ok(self.map.try_insert(key, ())?.is_none())
    }

    /// Returns `true` if the set contains `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Removes a key, returning `true` if it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        self.map.remove_entry(key).is_some()
    }

    /// Removes and returns the stored key equal to `key`.
    pub fn take(&mut self, key: &K) -> Option<K> {
        self.map.remove_entry(key).map(|(k, _)| k)
    }

    /// Returns an iterator over the keys.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            inner: self.map.keys(),
        }
    }

    /// Removes every key, returning them in iteration order.
    pub fn drain(&mut self) -> Drain<'_, K> {
        Drain {
            inner: self.map.drain(),
        }
    }

    /// Keeps only the keys for which `f` returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::PrimitiveHashSet;
    ///
    /// let mut set: PrimitiveHashSet<u64> = (1..=10).collect();
    /// set.retain(|&k| k % 2 == 0);
    /// assert_eq!(set.len(), 5);
    /// assert!(set.contains(&4));
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(&K) -> bool) {
        self.map.retain(|k, _| f(k));
    }

    /// Returns `true` if `self` and `other` have no keys in common.
    pub fn is_disjoint(&self, other: &Self) -> bool {
        if self.len() <= other.len() {
            self.iter().all(|k| !other.contains(k))
        } else {
            other.iter().all(|k| !self.contains(k))
        }
    }

    /// Returns `true` if `other` contains every key in `self`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::PrimitiveHashSet;
    ///
    /// let a: PrimitiveHashSet<i8> = [1, 2].into_iter().collect();
    /// let b: PrimitiveHashSet<i8> = [1, 2, 3].into_iter().collect();
    /// assert!(a.is_subset(&b));
    /// assert!(b.is_superset(&a));
    /// assert!(!b.is_subset(&a));
    /// ```
    pub fn is_subset(&self, other: &Self) -> bool {
        if self.len() > other.len() {
            return false;
        }
        self.iter().all(|k| other.contains(k))
    }

    /// Returns `true` if `self` contains every key in `other`.
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// Returns an iterator over the keys in `self` or `other`.
    pub fn union<'a>(&'a self, other: &'a Self) -> Union<'a, K> {
        Union {
            iter: self.iter().chain(other.difference(self)),
        }
    }

    /// Returns an iterator over the keys in both `self` and `other`.
    pub fn intersection<'a>(&'a self, other: &'a Self) -> Intersection<'a, K> {
        let (iter, other) = if self.len() <= other.len() {
            (self.iter(), other)
        } else {
            (other.iter(), self)
        };
        Intersection { iter, other }
    }

    /// Returns an iterator over the keys in `self` but not in `other`.
    pub fn difference<'a>(&'a self, other: &'a Self) -> Difference<'a, K> {
        Difference {
            iter: self.iter(),
            other,
        }
    }

    /// Returns an iterator over the keys in exactly one of `self` and
    /// `other`.
    pub fn symmetric_difference<'a>(&'a self, other: &'a Self) -> SymmetricDifference<'a, K> {
        SymmetricDifference {
            iter: self.difference(other).chain(other.difference(self)),
        }
    }

    /// Probe-length statistics for the current table layout.
    #[cfg(feature = "stats")]
    pub fn probe_stats(&self) -> crate::ProbeStats {
        self.map.probe_stats()
    }
}

impl<K: Key> Default for PrimitiveHashSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> FromIterator<K> for PrimitiveHashSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|k| (k, ())).collect(),
        }
    }
}

impl<K: Key> Extend<K> for PrimitiveHashSet<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        self.map.put_all(iter.into_iter().map(|k| (k, ())));
    }
}

impl<'a, K: Key> IntoIterator for &'a PrimitiveHashSet<K> {
    type IntoIter = Iter<'a, K>;
    type Item = &'a K;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Key> IntoIterator for PrimitiveHashSet<K> {
    type IntoIter = IntoIter<K>;
    type Item = K;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.map.into_iter(),
        }
    }
}

/// An iterator over the keys of a [`PrimitiveHashSet`].
pub struct Iter<'a, K> {
    inner: hash_map::Keys<'a, K, ()>,
}

impl<'a, K: Key> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Key> ExactSizeIterator for Iter<'_, K> {}
impl<K: Key> FusedIterator for Iter<'_, K> {}

/// An owning iterator over the keys of a [`PrimitiveHashSet`].
pub struct IntoIter<K> {
    inner: hash_map::IntoIter<K, ()>,
}

impl<K: Key> Iterator for IntoIter<K> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Key> ExactSizeIterator for IntoIter<K> {}

/// A draining iterator over the keys of a [`PrimitiveHashSet`].
pub struct Drain<'a, K: Key> {
    inner: cursor::Drain<'a, K, ()>,
}

impl<K: Key> Iterator for Drain<'_, K> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Key> ExactSizeIterator for Drain<'_, K> {}

impl<K: Key> FusedIterator for Drain<'_, K> {}

/// An iterator over the union of two sets.
pub struct Union<'a, K> {
    iter: Chain<Iter<'a, K>, Difference<'a, K>>,
}

impl<'a, K: Key> Iterator for Union<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

/// An iterator over the intersection of two sets.
pub struct Intersection<'a, K> {
    iter: Iter<'a, K>,
    other: &'a PrimitiveHashSet<K>,
}

impl<'a, K: Key> Iterator for Intersection<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let k = self.iter.next()?;
            if self.other.contains(k) {
                return Some(k);
            }
        }
    }
}

/// An iterator over the difference of two sets.
pub struct Difference<'a, K> {
    iter: Iter<'a, K>,
    other: &'a PrimitiveHashSet<K>,
}

impl<'a, K: Key> Iterator for Difference<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let k = self.iter.next()?;
            if !self.other.contains(k) {
                return Some(k);
            }
        }
    }
}

/// An iterator over the symmetric difference of two sets.
pub struct SymmetricDifference<'a, K> {
    iter: Chain<Difference<'a, K>, Difference<'a, K>>,
}

impl<'a, K: Key> Iterator for SymmetricDifference<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}
