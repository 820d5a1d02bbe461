use core::fmt::Debug;
use core::iter::FusedIterator;
use core::iter::Rev;
use core::iter::Zip;
use core::mem;
use core::ops::Add;
use core::slice;

use crate::error::Error;
use crate::error::growth_failed;
use crate::hash_table::DEFAULT_INITIAL_SIZE;
use crate::hash_table::DEFAULT_LOAD_FACTOR;
use crate::hash_table::FAST_LOAD_FACTOR;
use crate::hash_table::Probe;
use crate::hash_table::RawCursor;
use crate::hash_table::RawTable;
use crate::key::Key;

/// An open-addressing hash map from primitive keys to values.
///
/// Keys and values are stored unboxed in two parallel arrays. Collisions are
/// resolved by linear probing, and removal shifts later entries back instead
/// of leaving tombstones, so lookups never scan past deleted slots.
///
/// Absence is signalled with a settable *default return value* rather than
/// `Option`: [`get`], [`insert`], and [`remove`] return it when the key is not
/// present. [`find`], [`find_mut`], and [`remove_entry`] are the `Option`
/// counterparts.
///
/// # Sizing
///
/// A map built for `expected` entries with load factor `f` allocates the
/// smallest power-of-two table with at least `expected / f` slots. It grows
/// when an insertion would exceed the load factor and shrinks by half after a
/// removal that leaves it less than a quarter full, but never below the size
/// it was built with. [`trim`] can go lower.
///
/// [`get`]: PrimitiveHashMap::get
/// [`insert`]: PrimitiveHashMap::insert
/// [`remove`]: PrimitiveHashMap::remove
/// [`find`]: PrimitiveHashMap::find
/// [`find_mut`]: PrimitiveHashMap::find_mut
/// [`remove_entry`]: PrimitiveHashMap::remove_entry
/// [`trim`]: PrimitiveHashMap::trim
#[derive(Clone)]
pub struct PrimitiveHashMap<K, V> {
    pub(crate) table: RawTable<K, V>,
    default_return_value: V,
}

impl<K, V> Debug for PrimitiveHashMap<K, V>
where
    K: Key + Debug,
    V: Default + Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(k, v);
        }
        map.finish()
    }
}

impl<K, V> PrimitiveHashMap<K, V>
where
    K: Key,
    V: Default,
{
    /// Creates an empty map sized for [`DEFAULT_INITIAL_SIZE`] entries with
    /// the [`DEFAULT_LOAD_FACTOR`].
    ///
    /// [`DEFAULT_INITIAL_SIZE`]: crate::DEFAULT_INITIAL_SIZE
    /// [`DEFAULT_LOAD_FACTOR`]: crate::DEFAULT_LOAD_FACTOR
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_SIZE)
    }

    /// Creates an empty map that holds `expected` entries without growing.
    ///
    /// # Panics
    ///
    /// Panics if no table can be sized for `expected` entries, and aborts
    /// through [`handle_alloc_error`] if allocation fails.
    ///
    /// [`handle_alloc_error`]: alloc::alloc::handle_alloc_error
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::PrimitiveHashMap;
    ///
    /// let map: PrimitiveHashMap<u32, u32> = PrimitiveHashMap::with_capacity(100);
    /// assert!(map.capacity() >= 100);
    /// assert!(map.is_empty());
    /// ```
    pub fn with_capacity(expected: usize) -> Self {
        Self::with_capacity_and_load_factor(expected, DEFAULT_LOAD_FACTOR)
            .unwrap_or_else(|err| growth_failed(err))
    }

    /// Creates an empty map that holds `expected` entries at the given load
    /// factor without growing.
    ///
    /// # Errors
    ///
    /// Fails if `load_factor` is not in `(0, 1]`, or if the table cannot be
    /// sized or allocated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::Error;
    /// use prim_hash::FAST_LOAD_FACTOR;
    /// use prim_hash::PrimitiveHashMap;
    ///
    /// let map = PrimitiveHashMap::<i64, f64>::with_capacity_and_load_factor(4, FAST_LOAD_FACTOR)?;
    /// assert_eq!(map.table_size(), 8);
    ///
    /// let bad = PrimitiveHashMap::<i64, f64>::with_capacity_and_load_factor(4, 1.5);
    /// assert_eq!(bad.unwrap_err(), Error::InvalidLoadFactor(1.5));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn with_capacity_and_load_factor(expected: usize, load_factor: f32) -> Result<Self, Error> {
        Ok(Self {
            table: RawTable::try_new(expected, load_factor)?,
            default_return_value: V::default(),
        })
    }

    /// Builds a map from parallel key and value slices. Later duplicates of a
    /// key overwrite earlier ones.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::LengthMismatch`] if the slices differ in length, and
    /// otherwise as [`with_capacity_and_load_factor`] does.
    ///
    /// [`with_capacity_and_load_factor`]: PrimitiveHashMap::with_capacity_and_load_factor
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::PrimitiveHashMap;
    ///
    /// let map = PrimitiveHashMap::from_arrays(&[1u8, 2, 1], &[10u16, 20, 30], 0.75)?;
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map.get(&1), 30);
    /// # Ok::<(), prim_hash::Error>(())
    /// ```
    pub fn from_arrays(keys: &[K], values: &[V], load_factor: f32) -> Result<Self, Error>
    where
        V: Clone,
    {
        if keys.len() != values.len() {
            return Err(Error::LengthMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }

        let mut map = Self::with_capacity_and_load_factor(keys.len(), load_factor)?;
        for (key, value) in keys.iter().zip(values) {
            map.try_insert(key.clone(), value.clone())?;
        }
        Ok(map)
    }

    /// Builds a map from an iterator of entries at the given load factor.
    ///
    /// The table is sized once from the iterator's lower size hint.
    pub fn from_entries<I>(entries: I, load_factor: f32) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let entries = entries.into_iter();
        let mut map = Self::with_capacity_and_load_factor(entries.size_hint().0, load_factor)?;
        map.try_put_all(entries)?;
        Ok(map)
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Returns the number of entries the map can hold before it grows.
    pub fn capacity(&self) -> usize {
        self.table.max_fill()
    }

    /// Returns the number of probe slots in the table. Always a power of two.
    pub fn table_size(&self) -> usize {
        self.table.table_size()
    }

    /// Returns the load factor the map was built with.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Returns the value reported for absent keys.
    pub fn default_return_value(&self) -> &V {
        &self.default_return_value
    }

    /// Sets the value reported for absent keys by [`get`], [`insert`],
    /// [`remove`], and the other value-returning operations.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::PrimitiveHashMap;
    ///
    /// let mut map: PrimitiveHashMap<u32, i32> = PrimitiveHashMap::new();
    /// map.set_default_return_value(-1);
    ///
    /// assert_eq!(map.get(&7), -1);
    /// assert_eq!(map.insert(7, 70), -1);
    /// assert_eq!(map.insert(7, 71), 70);
    /// assert_eq!(map.remove(&7), 71);
    /// assert_eq!(map.remove(&7), -1);
    /// ```
    ///
    /// [`get`]: PrimitiveHashMap::get
    /// [`insert`]: PrimitiveHashMap::insert
    /// [`remove`]: PrimitiveHashMap::remove
    pub fn set_default_return_value(&mut self, value: V) {
        self.default_return_value = value;
    }

    /// Returns the value for `key`, or the default return value if absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::PrimitiveHashMap;
    ///
    /// let mut map = PrimitiveHashMap::new();
    /// map.insert(3u64, 4.5f64);
    /// assert_eq!(map.get(&3), 4.5);
    /// assert_eq!(map.get(&4), 0.0);
    /// ```
    pub fn get(&self, key: &K) -> V
    where
        V: Clone,
    {
        match self.table.find(key) {
            Probe::Found(slot) => self.table.value_at(slot).clone(),
            Probe::Vacant(_) => self.default_return_value.clone(),
        }
    }

    /// Returns the value for `key`, or `default` if absent.
    pub fn get_or_default(&self, key: &K, default: V) -> V
    where
        V: Clone,
    {
        match self.table.find(key) {
            Probe::Found(slot) => self.table.value_at(slot).clone(),
            Probe::Vacant(_) => default,
        }
    }

    /// Returns a reference to the value for `key`, if present.
    pub fn find(&self, key: &K) -> Option<&V> {
        match self.table.find(key) {
            Probe::Found(slot) => Some(self.table.value_at(slot)),
            Probe::Vacant(_) => None,
        }
    }

    /// Returns a mutable reference to the value for `key`, if present.
    pub fn find_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.table.find(key) {
            Probe::Found(slot) => Some(self.table.value_at_mut(slot)),
            Probe::Vacant(_) => None,
        }
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        matches!(self.table.find(key), Probe::Found(_))
    }

    /// Returns `true` if any entry has the given value. Scans the whole table.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.table.contains_value(value)
    }

    /// Inserts an entry, returning the previous value for `key` or the
    /// default return value if there was none.
    ///
    /// # Panics
    ///
    /// Aborts through [`handle_alloc_error`] if the table has to grow and
    /// allocation fails. Use [`try_insert`] to handle that case.
    ///
    /// [`handle_alloc_error`]: alloc::alloc::handle_alloc_error
    /// [`try_insert`]: PrimitiveHashMap::try_insert
    pub fn insert(&mut self, key: K, value: V) -> V
    where
        V: Clone,
    {
        match self.table.find(&key) {
            Probe::Found(slot) => mem::replace(self.table.value_at_mut(slot), value),
            Probe::Vacant(slot) => {
                self.table.insert_new(slot, key, value);
                self.default_return_value.clone()
            }
        }
    }

    /// Inserts an entry, returning the previous value for `key` if there was
    /// one.
    ///
    /// # Errors
    ///
    /// Fails if the table has to grow and the larger table cannot be sized or
    /// allocated. The map is unchanged in that case.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>, Error> {
        match self.table.find(&key) {
            Probe::Found(slot) => Ok(Some(mem::replace(self.table.value_at_mut(slot), value))),
            Probe::Vacant(slot) => {
                self.table.try_insert_new(slot, key, value)?;
                Ok(None)
            }
        }
    }

    /// Removes `key`, returning its value or the default return value if it
    /// was absent.
    pub fn remove(&mut self, key: &K) -> V
    where
        V: Clone,
    {
        match self.table.find(key) {
            Probe::Found(slot) => self.table.remove_at(slot, true).1,
            Probe::Vacant(_) => self.default_return_value.clone(),
        }
    }

    /// Removes `key`, returning the stored key and value if it was present.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        match self.table.find(key) {
            Probe::Found(slot) => Some(self.table.remove_at(slot, true)),
            Probe::Vacant(_) => None,
        }
    }

    /// Removes `key` only if it currently maps to `value`.
    pub fn remove_if_equals(&mut self, key: &K, value: &V) -> bool
    where
        V: PartialEq,
    {
        match self.table.find(key) {
            Probe::Found(slot) if self.table.value_at(slot) == value => {
                self.table.remove_at(slot, true);
                true
            }
            _ => false,
        }
    }

    /// Inserts `value` only if `key` is absent. Returns the existing value, or
    /// the default return value if the entry was inserted.
    pub fn put_if_absent(&mut self, key: K, value: V) -> V
    where
        V: Clone,
    {
        match self.table.find(&key) {
            Probe::Found(slot) => self.table.value_at(slot).clone(),
            Probe::Vacant(slot) => {
                self.table.insert_new(slot, key, value);
                self.default_return_value.clone()
            }
        }
    }

    /// Replaces the value of `key` only if it is present. Returns the old value
    /// or the default return value.
    pub fn replace(&mut self, key: &K, value: V) -> V
    where
        V: Clone,
    {
        match self.table.find(key) {
            Probe::Found(slot) => mem::replace(self.table.value_at_mut(slot), value),
            Probe::Vacant(_) => self.default_return_value.clone(),
        }
    }

    /// Replaces the value of `key` only if it currently maps to `old`.
    pub fn replace_if_equals(&mut self, key: &K, old: &V, new: V) -> bool
    where
        V: PartialEq,
    {
        match self.table.find(key) {
            Probe::Found(slot) if self.table.value_at(slot) == old => {
                *self.table.value_at_mut(slot) = new;
                true
            }
            _ => false,
        }
    }

    /// Returns the value of `key`, first inserting `f(&key)` if it is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::PrimitiveHashMap;
    ///
    /// let mut squares: PrimitiveHashMap<u32, u32> = PrimitiveHashMap::new();
    /// assert_eq!(squares.compute_if_absent(9, |k| k * k), 81);
    /// assert_eq!(squares.compute_if_absent(9, |_| unreachable!()), 81);
    /// ```
    pub fn compute_if_absent<F>(&mut self, key: K, f: F) -> V
    where
        V: Clone,
        F: FnOnce(&K) -> V,
    {
        match self.table.find(&key) {
            Probe::Found(slot) => self.table.value_at(slot).clone(),
            Probe::Vacant(slot) => {
                let value = f(&key);
                let slot = self.table.insert_new(slot, key, value);
                self.table.value_at(slot).clone()
            }
        }
    }

    /// If `key` is present, replaces its value with `f(&key, &old)`, or
    /// removes the entry when `f` returns `None`.
    ///
    /// Returns the new value, or the default return value if the key was
    /// absent or removed.
    pub fn compute_if_present<F>(&mut self, key: &K, f: F) -> V
    where
        V: Clone,
        F: FnOnce(&K, &V) -> Option<V>,
    {
        let Probe::Found(slot) = self.table.find(key) else {
            return self.default_return_value.clone();
        };

        let (stored, value) = self.table.entry_at_mut(slot);
        match f(stored, &*value) {
            Some(new) => {
                *value = new;
                value.clone()
            }
            None => {
                self.table.remove_at(slot, true);
                self.default_return_value.clone()
            }
        }
    }

    /// Replaces the entry for `key` with `f(&key, current)`. `None` on either
    /// side stands for absence: returning `None` removes the entry.
    ///
    /// Returns the new value, or the default return value if there is none.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::PrimitiveHashMap;
    ///
    /// let mut counts: PrimitiveHashMap<char, u32> = PrimitiveHashMap::new();
    /// for c in "abracadabra".chars() {
    ///     counts.compute(c, |_, n| Some(n.copied().unwrap_or(0) + 1));
    /// }
    /// assert_eq!(counts.get(&'a'), 5);
    ///
    /// counts.compute('a', |_, _| None);
    /// assert!(!counts.contains_key(&'a'));
    /// ```
    pub fn compute<F>(&mut self, key: K, f: F) -> V
    where
        V: Clone,
        F: FnOnce(&K, Option<&V>) -> Option<V>,
    {
        match self.table.find(&key) {
            Probe::Found(slot) => {
                let (stored, value) = self.table.entry_at_mut(slot);
                match f(stored, Some(&*value)) {
                    Some(new) => {
                        *value = new;
                        value.clone()
                    }
                    None => {
                        self.table.remove_at(slot, true);
                        self.default_return_value.clone()
                    }
                }
            }
            Probe::Vacant(slot) => match f(&key, None) {
                Some(new) => {
                    let slot = self.table.insert_new(slot, key, new);
                    self.table.value_at(slot).clone()
                }
                None => self.default_return_value.clone(),
            },
        }
    }

    /// Inserts `value` if `key` is absent; otherwise replaces the current
    /// value with `f(&current, value)`, removing the entry if that is `None`.
    ///
    /// Returns the new value, or the default return value if removed.
    pub fn merge<F>(&mut self, key: K, value: V, f: F) -> V
    where
        V: Clone,
        F: FnOnce(&V, V) -> Option<V>,
    {
        match self.table.find(&key) {
            Probe::Found(slot) => match f(self.table.value_at(slot), value) {
                Some(new) => {
                    *self.table.value_at_mut(slot) = new;
                    self.table.value_at(slot).clone()
                }
                None => {
                    self.table.remove_at(slot, true);
                    self.default_return_value.clone()
                }
            },
            Probe::Vacant(slot) => {
                let slot = self.table.insert_new(slot, key, value);
                self.table.value_at(slot).clone()
            }
        }
    }

    /// Adds `increment` to the value of `key`, treating an absent key as
    /// holding the default return value. Returns the value before the
    /// addition.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::PrimitiveHashMap;
    ///
    /// let mut totals: PrimitiveHashMap<u16, i64> = PrimitiveHashMap::new();
    /// totals.set_default_return_value(100);
    /// assert_eq!(totals.add_to(1, 5), 100);
    /// assert_eq!(totals.add_to(1, -20), 105);
    /// assert_eq!(totals.get(&1), 85);
    /// ```
    pub fn add_to(&mut self, key: K, increment: V) -> V
    where
        V: Add<Output = V> + Clone,
    {
        match self.table.find(&key) {
            Probe::Found(slot) => {
                let value = self.table.value_at_mut(slot);
                let old = value.clone();
                *value = old.clone() + increment;
                old
            }
            Probe::Vacant(slot) => {
                let base = self.default_return_value.clone();
                self.table.insert_new(slot, key, base.clone() + increment);
                base
            }
        }
    }

    /// Inserts every entry from `entries`, sizing the table once up front.
    ///
    /// With a load factor of at most one half the table is sized for the
    /// incoming entries alone; otherwise it is sized for the current plus
    /// incoming entries, on the assumption that few keys overlap.
    pub fn put_all<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        if let Err(err) = self.try_put_all(entries) {
            growth_failed(err);
        }
    }

    /// Fallible [`put_all`]. Entries inserted before a failure stay in the
    /// map.
    ///
    /// [`put_all`]: PrimitiveHashMap::put_all
    pub fn try_put_all<I>(&mut self, entries: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let entries = entries.into_iter();
        let (incoming, _) = entries.size_hint();
        if self.table.load_factor() <= FAST_LOAD_FACTOR {
            self.table.try_ensure_capacity(incoming)?;
        } else {
            self.table
                .try_tentative_capacity(self.len().saturating_add(incoming))?;
        }

        for (key, value) in entries {
            self.try_insert(key, value)?;
        }
        Ok(())
    }

    /// Keeps only the entries for which `f` returns `true`.
    ///
    /// Never shrinks the table; call [`trim`] afterwards to reclaim memory.
    ///
    /// [`trim`]: PrimitiveHashMap::trim
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut cursor = RawCursor::new(&self.table);
        while let Some(slot) = cursor.next_slot(&self.table) {
            let (key, value) = self.table.entry_at_mut(slot);
            if !f(key, value) {
                // The cursor has just returned this slot, so removal cannot fail.
                let _ = cursor.remove(&mut self.table);
            }
        }
    }

    /// Removes every entry, keeping the table size.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Grows the table, if needed, so that `expected` entries fit without
    /// rehashing.
    pub fn ensure_capacity(&mut self, expected: usize) {
        if let Err(err) = self.table.try_ensure_capacity(expected) {
            growth_failed(err);
        }
    }

    /// Reserves room for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) {
        self.ensure_capacity(self.len().saturating_add(additional));
    }

    /// Fallible [`reserve`].
    ///
    /// [`reserve`]: PrimitiveHashMap::reserve
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.table
            .try_ensure_capacity(self.len().saturating_add(additional))
    }

    /// Shrinks the table to the smallest size that holds the current entries.
    ///
    /// Unlike automatic shrinking this may go below the size the map was built
    /// with. Returns `false`, leaving the map untouched, if the smaller table
    /// cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::PrimitiveHashMap;
    ///
    /// let mut map: PrimitiveHashMap<u32, u32> = PrimitiveHashMap::with_capacity(10_000);
    /// map.insert(1, 1);
    /// assert!(map.trim());
    /// assert_eq!(map.table_size(), 2);
    /// assert_eq!(map.get(&1), 1);
    /// ```
    pub fn trim(&mut self) -> bool {
        self.table.trim_to(self.len())
    }

    /// Shrinks the table to the smallest size that holds `entries` entries,
    /// or the current entries if there are more. See [`trim`].
    ///
    /// [`trim`]: PrimitiveHashMap::trim
    pub fn trim_to(&mut self, entries: usize) -> bool {
        self.table.trim_to(entries)
    }

    /// Gets the entry for `key` for in-place manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::PrimitiveHashMap;
    ///
    /// let mut map: PrimitiveHashMap<i8, u64> = PrimitiveHashMap::new();
    /// *map.entry(-3).or_insert(10) += 1;
    /// *map.entry(-3).or_insert(10) += 1;
    /// assert_eq!(map.get(&-3), 12);
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        match self.table.find(&key) {
            Probe::Found(slot) => Entry::Occupied(OccupiedEntry { map: self, slot }),
            Probe::Vacant(slot) => Entry::Vacant(VacantEntry {
                map: self,
                key,
                slot,
            }),
        }
    }

    /// Returns an iterator over the entries.
    ///
    /// The entry stored under the sentinel key comes first, followed by the
    /// rest in descending slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            table: &self.table,
            cursor: RawCursor::new(&self.table),
        }
    }

    /// Returns an iterator over the entries with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let n = self.table.table_size();
        let remaining = self.table.len();
        let contains_sentinel_key = self.table.contains_sentinel_key();
        let (keys, values) = self.table.slots_mut();
        let (keys, sentinel_key) = keys.split_at(n);
        let (values, sentinel_value) = values.split_at_mut(n);

        IterMut {
            sentinel: if contains_sentinel_key {
                sentinel_key.first().zip(sentinel_value.first_mut())
            } else {
                None
            },
            slots: keys.iter().zip(values.iter_mut()).rev(),
            remaining,
        }
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Probe-length statistics for the current table layout.
    #[cfg(feature = "stats")]
    pub fn probe_stats(&self) -> crate::ProbeStats {
        self.table.probe_stats()
    }
}

impl<K, V> Default for PrimitiveHashMap<K, V>
where
    K: Key,
    V: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> PartialEq for PrimitiveHashMap<K, V>
where
    K: Key,
    V: Default + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.find(key).is_some_and(|v| v == value))
    }
}

impl<K, V> Extend<(K, V)> for PrimitiveHashMap<K, V>
where
    K: Key,
    V: Default,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.put_all(iter);
    }
}

impl<K, V> FromIterator<(K, V)> for PrimitiveHashMap<K, V>
where
    K: Key,
    V: Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut map = Self::with_capacity(iter.size_hint().0.max(DEFAULT_INITIAL_SIZE));
        map.put_all(iter);
        map
    }
}

impl<'a, K, V> IntoIterator for &'a PrimitiveHashMap<K, V>
where
    K: Key,
    V: Default,
{
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut PrimitiveHashMap<K, V>
where
    K: Key,
    V: Default,
{
    type IntoIter = IterMut<'a, K, V>;
    type Item = (&'a K, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V> IntoIterator for PrimitiveHashMap<K, V>
where
    K: Key,
    V: Default,
{
    type IntoIter = IntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            cursor: RawCursor::new(&self.table),
            table: self.table,
        }
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`PrimitiveHashMap`].
///
/// [`entry`]: PrimitiveHashMap::entry
pub enum Entry<'a, K, V> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V>
where
    K: Key,
    V: Default,
{
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference to the value.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Inserts `V::default()` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(V::default)
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V> {
    map: &'a mut PrimitiveHashMap<K, V>,
    key: K,
    slot: usize,
}

impl<'a, K, V> VacantEntry<'a, K, V>
where
    K: Key,
    V: Default,
{
    /// Gets a reference to the key that would be used when inserting a value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        let table = &mut self.map.table;
        let slot = table.insert_new(self.slot, self.key, value);
        table.value_at_mut(slot)
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V> {
    map: &'a mut PrimitiveHashMap<K, V>,
    slot: usize,
}

impl<'a, K, V> OccupiedEntry<'a, K, V>
where
    K: Key,
    V: Default,
{
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        self.map.table.key_at(self.slot)
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        self.map.table.value_at(self.slot)
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        self.map.table.value_at_mut(self.slot)
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        self.map.table.value_at_mut(self.slot)
    }

    /// Inserts a value into the entry and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        mem::replace(self.get_mut(), value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.map.table.remove_at(self.slot, true)
    }
}

/// An iterator over the entries of a [`PrimitiveHashMap`].
pub struct Iter<'a, K, V> {
    table: &'a RawTable<K, V>,
    cursor: RawCursor<K>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V>
where
    K: Key,
    V: Default,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.table;
        let slot = self.cursor.next_slot(table)?;
        Some((table.key_at(slot), table.value_at(slot)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.remaining();
        (remaining, Some(remaining))
    }
}

impl<K: Key, V: Default> ExactSizeIterator for Iter<'_, K, V> {}
impl<K: Key, V: Default> FusedIterator for Iter<'_, K, V> {}

/// An iterator over the entries of a [`PrimitiveHashMap`] with mutable
/// values.
pub struct IterMut<'a, K, V> {
    sentinel: Option<(&'a K, &'a mut V)>,
    slots: Rev<Zip<slice::Iter<'a, K>, slice::IterMut<'a, V>>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V>
where
    K: Key,
{
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        if let Some(entry) = self.sentinel.take() {
            return Some(entry);
        }
        self.slots.find(|(key, _)| !key.is_sentinel())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Key, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K: Key, V> FusedIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of a [`PrimitiveHashMap`].
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V>
where
    K: Key,
    V: Default,
{
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Key, V: Default> ExactSizeIterator for Keys<'_, K, V> {}

/// An iterator over the values of a [`PrimitiveHashMap`].
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V>
where
    K: Key,
    V: Default,
{
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Key, V: Default> ExactSizeIterator for Values<'_, K, V> {}

/// An iterator over mutable references to the values of a
/// [`PrimitiveHashMap`].
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V>
where
    K: Key,
{
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Key, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

/// An owning iterator over the entries of a [`PrimitiveHashMap`].
pub struct IntoIter<K, V> {
    table: RawTable<K, V>,
    cursor: RawCursor<K>,
}

impl<K, V> Iterator for IntoIter<K, V>
where
    K: Key,
    V: Default,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor.next_slot(&self.table)?;
        Some(self.table.take_slot(slot))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.remaining();
        (remaining, Some(remaining))
    }
}

impl<K: Key, V: Default> ExactSizeIterator for IntoIter<K, V> {}
impl<K: Key, V: Default> FusedIterator for IntoIter<K, V> {}
