//! `Option`-based map access for code that is generic over map types.
//!
//! [`PrimitiveHashMap`] reports absence through its default return value.
//! [`GenericMap`] is the conventional interface on top of it: absence is
//! `None`, and the same trait is implemented for [`std::collections::HashMap`]
//! so callers can switch between the two.

use crate::hash_map::PrimitiveHashMap;
use crate::key::Key;

/// A key-value map with `Option`-based absence.
///
/// Method names match the inherent methods of [`PrimitiveHashMap`], which take
/// precedence in method-call syntax. Call through the trait
/// (`GenericMap::get(&map, &key)`) or from generic code to get the `Option`
/// behaviour.
///
/// # Examples
///
/// ```rust
/// use prim_hash::GenericMap;
/// use prim_hash::PrimitiveHashMap;
///
/// fn total<M: GenericMap<u32, u64>>(map: &M, keys: &[u32]) -> u64 {
///     keys.iter().filter_map(|k| map.get(k)).sum()
/// }
///
/// let mut map = PrimitiveHashMap::new();
/// map.insert(1, 10);
/// map.insert(2, 20);
/// assert_eq!(total(&map, &[1, 2, 3]), 30);
///
/// let std_map: std::collections::HashMap<u32, u64> = [(1, 10), (2, 20)].into();
/// assert_eq!(total(&std_map, &[1, 2, 3]), 30);
/// ```
pub trait GenericMap<K, V> {
    /// Number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if there are no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value for `key`, if present.
    fn get(&self, key: &K) -> Option<&V>;

    /// Returns `true` if `key` is present.
    fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Inserts an entry, returning the previous value if there was one.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Removes `key`, returning its value if it was present.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Removes every entry.
    fn clear(&mut self);

    /// Calls `f` on every entry.
    fn for_each_entry(&self, f: &mut dyn FnMut(&K, &V));
}

impl<K, V> GenericMap<K, V> for PrimitiveHashMap<K, V>
where
    K: Key,
    V: Default,
{
    fn len(&self) -> usize {
        PrimitiveHashMap::len(self)
    }

    fn get(&self, key: &K) -> Option<&V> {
        self.find(key)
    }

    fn contains_key(&self, key: &K) -> bool {
        PrimitiveHashMap::contains_key(self, key)
    }

    fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.entry(key) {
            crate::Entry::Occupied(mut entry) => Some(entry.insert(value)),
            crate::Entry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    fn clear(&mut self) {
        PrimitiveHashMap::clear(self);
    }

    fn for_each_entry(&self, f: &mut dyn FnMut(&K, &V)) {
        for (k, v) in self.iter() {
            f(k, v);
        }
    }
}

#[cfg(feature = "std")]
impl<K, V, S> GenericMap<K, V> for std::collections::HashMap<K, V, S>
where
    K: core::hash::Hash + Eq,
    S: core::hash::BuildHasher,
{
    fn len(&self) -> usize {
        std::collections::HashMap::len(self)
    }

    fn get(&self, key: &K) -> Option<&V> {
        std::collections::HashMap::get(self, key)
    }

    fn insert(&mut self, key: K, value: V) -> Option<V> {
        std::collections::HashMap::insert(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        std::collections::HashMap::remove(self, key)
    }

    fn clear(&mut self) {
        std::collections::HashMap::clear(self);
    }

    fn for_each_entry(&self, f: &mut dyn FnMut(&K, &V)) {
        for (k, v) in self {
            f(k, v);
        }
    }
}

impl<K, V> PrimitiveHashMap<K, V>
where
    K: Key,
    V: Default + Clone,
{
    /// Copies every entry of another map into a new map sized for it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::collections::HashMap;
    ///
    /// use prim_hash::PrimitiveHashMap;
    ///
    /// let source: HashMap<i32, f32> = [(1, 0.5), (2, 1.5)].into();
    /// let copy = PrimitiveHashMap::from_generic(&source);
    /// assert_eq!(copy.len(), 2);
    /// assert_eq!(copy.get(&2), 1.5);
    /// ```
    pub fn from_generic<M>(other: &M) -> Self
    where
        M: GenericMap<K, V> + ?Sized,
    {
        let mut map = Self::with_capacity(other.len());
        other.for_each_entry(&mut |k, v| {
            map.insert(k.clone(), v.clone());
        });
        map
    }
}
