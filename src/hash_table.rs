//! The open-addressing table behind every map and set in this crate.
//!
//! Keys and values live in two parallel arrays of length `n + 1`, where `n` is
//! a power of two. Slots `0..n` are addressed by `mix(hash) & (n - 1)` and
//! resolved by linear probing; an empty slot holds the key type's sentinel.
//! Slot `n` is reserved for the sentinel key itself, so no separate occupancy
//! array is needed. Removal uses backward-shift deletion, so the table never
//! contains tombstones.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::alloc::Layout;
use core::mem;

use crate::error::Error;
use crate::error::IterError;
use crate::error::growth_failed;
use crate::key::Key;
use crate::key::mix;

/// Expected number of entries used by constructors that don't take one.
pub const DEFAULT_INITIAL_SIZE: usize = 16;
/// Load factor used by constructors that don't take one.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;
/// A load factor trading memory for shorter probe sequences.
pub const FAST_LOAD_FACTOR: f32 = 0.5;
/// A load factor trading even more memory for even shorter probe sequences.
pub const VERY_FAST_LOAD_FACTOR: f32 = 0.25;

/// Largest table size (excluding the sentinel slot) we will try to allocate.
const MAX_TABLE_SIZE: usize = 1 << (usize::BITS - 2);

/// Smallest power-of-two table size, at least 2, whose load-factor share
/// covers `expected` entries.
pub(crate) fn array_size(expected: usize, load_factor: f32) -> Result<usize, Error> {
    let needed = (expected as f64 / f64::from(load_factor)).ceil();
    if needed > MAX_TABLE_SIZE as f64 {
        return Err(Error::CapacityOverflow {
            requested: expected,
        });
    }

    Ok((needed as usize).next_power_of_two().max(2))
}

/// Like [`array_size`], but clamps instead of failing. Used for speculative
/// pre-sizing where the entry count is only a guess.
fn tentative_array_size(expected: usize, load_factor: f32) -> usize {
    let needed = (expected as f64 / f64::from(load_factor)).ceil();
    if needed >= MAX_TABLE_SIZE as f64 {
        MAX_TABLE_SIZE
    } else {
        (needed as usize).next_power_of_two().max(2)
    }
}

/// Number of entries a table of `n` slots may hold. Always leaves at least
/// one slot empty so that probing terminates.
#[inline]
pub(crate) fn max_fill(n: usize, load_factor: f32) -> usize {
    ((n as f64 * f64::from(load_factor)).ceil() as usize).min(n - 1)
}

fn try_alloc_slots<T>(len: usize, fill: impl FnMut() -> T) -> Result<Box<[T]>, Error> {
    let layout =
        Layout::array::<T>(len).map_err(|_| Error::CapacityOverflow { requested: len })?;
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(len)
        .map_err(|_| Error::Alloc { layout })?;
    slots.resize_with(len, fill);
    Ok(slots.into_boxed_slice())
}

/// Outcome of probing for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Probe {
    /// The key is stored at this slot.
    Found(usize),
    /// The key is absent; this is where it would be inserted.
    Vacant(usize),
}

#[derive(Clone)]
pub(crate) struct RawTable<K, V> {
    keys: Box<[K]>,
    values: Box<[V]>,

    n: usize,
    mask: usize,
    contains_sentinel_key: bool,

    size: usize,
    max_fill: usize,
    min_n: usize,
    load_factor: f32,
}

impl<K, V> RawTable<K, V>
where
    K: Key,
    V: Default,
{
    pub(crate) fn try_new(expected: usize, load_factor: f32) -> Result<Self, Error> {
        // Written as a negated range check so that NaN is rejected too.
        if !(load_factor > 0.0 && load_factor <= 1.0) {
            return Err(Error::InvalidLoadFactor(load_factor));
        }

        let n = array_size(expected, load_factor)?;
        Ok(Self {
            keys: try_alloc_slots(n + 1, K::sentinel)?,
            values: try_alloc_slots(n + 1, V::default)?,
            n,
            mask: n - 1,
            contains_sentinel_key: false,
            size: 0,
            max_fill: max_fill(n, load_factor),
            min_n: n,
            load_factor,
        })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub(crate) fn table_size(&self) -> usize {
        self.n
    }

    #[inline]
    pub(crate) fn max_fill(&self) -> usize {
        self.max_fill
    }

    #[cfg(test)]
    pub(crate) fn min_table_size(&self) -> usize {
        self.min_n
    }

    #[inline]
    pub(crate) fn load_factor(&self) -> f32 {
        self.load_factor
    }

    #[inline]
    pub(crate) fn contains_sentinel_key(&self) -> bool {
        self.contains_sentinel_key
    }

    #[inline]
    pub(crate) fn key_at(&self, slot: usize) -> &K {
        &self.keys[slot]
    }

    #[inline]
    pub(crate) fn value_at(&self, slot: usize) -> &V {
        &self.values[slot]
    }

    #[inline]
    pub(crate) fn value_at_mut(&mut self, slot: usize) -> &mut V {
        &mut self.values[slot]
    }

    #[inline]
    pub(crate) fn entry_at_mut(&mut self, slot: usize) -> (&K, &mut V) {
        (&self.keys[slot], &mut self.values[slot])
    }

    /// All `n + 1` key and value slots, including empty ones.
    #[inline]
    pub(crate) fn slots_mut(&mut self) -> (&[K], &mut [V]) {
        (&self.keys, &mut self.values)
    }

    #[inline(always)]
    fn home(&self, key: &K) -> usize {
        (mix(key.hash_bits()) as usize) & self.mask
    }

    #[inline]
    pub(crate) fn find(&self, key: &K) -> Probe {
        if key.is_sentinel() {
            return if self.contains_sentinel_key {
                Probe::Found(self.n)
            } else {
                Probe::Vacant(self.n)
            };
        }

        let mut pos = self.home(key);
        loop {
            let current = &self.keys[pos];
            if current.is_sentinel() {
                return Probe::Vacant(pos);
            }
            if current.key_eq(key) {
                return Probe::Found(pos);
            }
            pos = (pos + 1) & self.mask;
        }
    }

    /// Slot of a key known to be present and not the sentinel.
    fn locate(&self, key: &K) -> usize {
        let mut pos = self.home(key);
        while !self.keys[pos].key_eq(key) {
            debug_assert!(!self.keys[pos].is_sentinel(), "located key is missing");
            pos = (pos + 1) & self.mask;
        }
        pos
    }

    /// Insertion slot for a key known to be absent.
    fn vacant_slot(&self, key: &K) -> usize {
        if key.is_sentinel() {
            return self.n;
        }

        let mut pos = self.home(key);
        while !self.keys[pos].is_sentinel() {
            pos = (pos + 1) & self.mask;
        }
        pos
    }

    /// Places a new entry at `slot`, a vacancy returned by [`find`] on this
    /// table. Grows first if the entry would exceed `max_fill`; in that case
    /// the slot is recomputed. On error nothing has changed.
    ///
    /// Returns the slot the entry ended up in.
    ///
    /// [`find`]: RawTable::find
    pub(crate) fn try_insert_new(&mut self, slot: usize, key: K, value: V) -> Result<usize, Error> {
        let mut slot = slot;
        if self.size >= self.max_fill {
            let target = array_size(self.size + 2, self.load_factor)?;
            self.try_rehash(target)?;
            slot = self.vacant_slot(&key);
        }

        if slot == self.n {
            self.contains_sentinel_key = true;
        }
        self.keys[slot] = key;
        self.values[slot] = value;
        self.size += 1;

        debug_assert!(self.size <= self.max_fill);
        Ok(slot)
    }

    pub(crate) fn insert_new(&mut self, slot: usize, key: K, value: V) -> usize {
        match self.try_insert_new(slot, key, value) {
            Ok(slot) => slot,
            Err(err) => growth_failed(err),
        }
    }

    /// Removes the entry at an occupied `slot`, shrinking the table afterwards
    /// if it has become sparse and `shrink` is set.
    pub(crate) fn remove_at(&mut self, slot: usize, shrink: bool) -> (K, V) {
        let removed = self.remove_at_with(slot, |_| {});
        if shrink {
            self.maybe_shrink();
        }
        removed
    }

    /// Removes the entry at an occupied `slot` without resizing. `on_wrap` sees
    /// every key that backward shifting moves from a lower slot to a higher
    /// one.
    fn remove_at_with(&mut self, slot: usize, on_wrap: impl FnMut(&K)) -> (K, V) {
        let key = mem::replace(&mut self.keys[slot], K::sentinel());
        let value = mem::take(&mut self.values[slot]);
        self.size -= 1;

        if slot == self.n {
            self.contains_sentinel_key = false;
        } else {
            self.shift_keys(slot, on_wrap);
        }

        (key, value)
    }

    /// Closes the gap at `pos` by walking the cluster after it and pulling
    /// back every entry whose home slot does not lie cyclically in
    /// `(gap, candidate]`. Such an entry is still reachable from its home after
    /// moving into the gap, and the slot it vacates becomes the next gap.
    fn shift_keys(&mut self, pos: usize, mut on_wrap: impl FnMut(&K)) {
        let mut pos = pos;
        loop {
            let last = pos;
            pos = (last + 1) & self.mask;

            loop {
                let current = &self.keys[pos];
                if current.is_sentinel() {
                    return;
                }

                let slot = self.home(current);
                let movable = if last <= pos {
                    last >= slot || slot > pos
                } else {
                    last >= slot && slot > pos
                };
                if movable {
                    break;
                }

                pos = (pos + 1) & self.mask;
            }

            if pos < last {
                on_wrap(&self.keys[pos]);
            }

            // The gap at `last` holds a sentinel and a default value, so
            // swapping moves the entry back and the gap forward in one step.
            self.keys.swap(last, pos);
            self.values.swap(last, pos);
        }
    }

    fn maybe_shrink(&mut self) {
        if self.n > self.min_n && self.size < self.max_fill / 4 {
            let target = self.n / 2;
            if let Err(err) = self.try_rehash(target) {
                log::warn!("keeping {} slots, shrink to {target} failed: {err}", self.n);
            }
        }
    }

    /// Moves every entry into freshly allocated arrays of `new_n + 1` slots.
    /// Both arrays are allocated before anything is touched, so a failed
    /// allocation leaves the table as it was.
    pub(crate) fn try_rehash(&mut self, new_n: usize) -> Result<(), Error> {
        debug_assert!(new_n.is_power_of_two());
        debug_assert!(self.size <= max_fill(new_n, self.load_factor));

        let mut new_keys = try_alloc_slots(new_n + 1, K::sentinel)?;
        let mut new_values = try_alloc_slots(new_n + 1, V::default)?;
        let new_mask = new_n - 1;

        log::debug!(
            "rehashing {} entries from {} to {new_n} slots",
            self.size,
            self.n
        );

        for i in 0..self.n {
            if self.keys[i].is_sentinel() {
                continue;
            }

            let mut pos = (mix(self.keys[i].hash_bits()) as usize) & new_mask;
            while !new_keys[pos].is_sentinel() {
                pos = (pos + 1) & new_mask;
            }
            new_keys[pos] = mem::replace(&mut self.keys[i], K::sentinel());
            new_values[pos] = mem::take(&mut self.values[i]);
        }

        new_keys[new_n] = mem::replace(&mut self.keys[self.n], K::sentinel());
        new_values[new_n] = mem::take(&mut self.values[self.n]);

        self.n = new_n;
        self.mask = new_mask;
        self.max_fill = max_fill(new_n, self.load_factor);
        self.keys = new_keys;
        self.values = new_values;

        Ok(())
    }

    /// Grows, if needed, so that `expected` entries fit without rehashing.
    pub(crate) fn try_ensure_capacity(&mut self, expected: usize) -> Result<(), Error> {
        let needed = array_size(expected, self.load_factor)?;
        if needed > self.n {
            self.try_rehash(needed)?;
        }
        Ok(())
    }

    /// Grows towards a table sized for `expected` entries, clamping at the
    /// maximum table size instead of failing.
    pub(crate) fn try_tentative_capacity(&mut self, expected: usize) -> Result<(), Error> {
        let needed = tentative_array_size(expected, self.load_factor);
        if needed > self.n {
            self.try_rehash(needed)?;
        }
        Ok(())
    }

    /// Shrinks to the smallest table that holds `entries` entries (but never
    /// fewer than are present). May go below the construction-time size.
    ///
    /// Returns `false` only if the smaller table could not be allocated.
    pub(crate) fn trim_to(&mut self, entries: usize) -> bool {
        let Ok(mut target) = array_size(entries.max(self.size), self.load_factor) else {
            return true;
        };
        // At load factor 1 the last slot stays free.
        if self.size > max_fill(target, self.load_factor) {
            target *= 2;
        }
        if target >= self.n {
            return true;
        }

        match self.try_rehash(target) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("trim to {target} slots failed: {err}");
                false
            }
        }
    }

    /// Empties every slot, keeping the current table size.
    pub(crate) fn clear(&mut self) {
        if self.size == 0 {
            return;
        }

        self.size = 0;
        self.contains_sentinel_key = false;
        self.keys.fill_with(K::sentinel);
        self.values.fill_with(V::default);
    }

    /// Moves an entry out of an occupied slot with no probe bookkeeping. Only
    /// valid when the table is being consumed in slot order.
    pub(crate) fn take_slot(&mut self, slot: usize) -> (K, V) {
        self.size -= 1;
        if slot == self.n {
            self.contains_sentinel_key = false;
        }
        (
            mem::replace(&mut self.keys[slot], K::sentinel()),
            mem::take(&mut self.values[slot]),
        )
    }

    pub(crate) fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        if self.contains_sentinel_key && self.values[self.n] == *value {
            return true;
        }

        self.keys[..self.n]
            .iter()
            .zip(self.values[..self.n].iter())
            .any(|(k, v)| !k.is_sentinel() && v == value)
    }

    /// Probe-length statistics for the current layout.
    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn probe_stats(&self) -> ProbeStats {
        let mut histogram = alloc::vec![0usize; 1];
        if self.contains_sentinel_key {
            histogram[0] += 1;
        }

        for (slot, key) in self.keys[..self.n].iter().enumerate() {
            if key.is_sentinel() {
                continue;
            }

            let distance = slot.wrapping_sub(self.home(key)) & self.mask;
            if distance >= histogram.len() {
                histogram.resize(distance + 1, 0);
            }
            histogram[distance] += 1;
        }

        ProbeStats {
            populated: self.size,
            table_size: self.n,
            max_fill: self.max_fill,
            longest_probe: histogram.len() - 1,
            histogram,
        }
    }
}

/// Probe-length statistics for a table.
///
/// Only compiled with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeStats {
    /// Number of entries, including the sentinel-slot entry.
    pub populated: usize,
    /// Number of probe slots (the sentinel slot is not counted).
    pub table_size: usize,
    /// Number of entries allowed before the table grows.
    pub max_fill: usize,
    /// Distance from home of the worst-placed entry.
    pub longest_probe: usize,
    /// `histogram[d]` is the number of entries `d` slots past their home.
    pub histogram: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeStats {
    /// Mean distance of an entry from its home slot.
    pub fn mean_probe(&self) -> f64 {
        if self.populated == 0 {
            return 0.0;
        }

        let total: usize = self
            .histogram
            .iter()
            .enumerate()
            .map(|(distance, count)| distance * count)
            .sum();
        total as f64 / self.populated as f64
    }

    /// Pretty-print the statistics as a horizontal bar chart.
    #[cfg(all(feature = "std", feature = "stats"))]
    pub fn print(&self) {
        println!("=== Probe Statistics ===");
        println!(
            "Population: {}/{} ({} slots, {:.2}% full)",
            self.populated,
            self.max_fill,
            self.table_size,
            self.populated as f64 / self.table_size as f64 * 100.0
        );
        println!(
            "Probe length: mean {:.3}, longest {}",
            self.mean_probe(),
            self.longest_probe
        );

        let max = self.histogram.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        for (distance, &count) in self.histogram.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{distance:>3} | {} ({count})", "█".repeat(width));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    NotStarted,
    Slot(usize),
    Wrapped(usize),
    Removed,
    Exhausted,
}

/// Traversal state shared by every iterator over a [`RawTable`].
///
/// The order is: the sentinel slot, then slots `n - 1` down to `0`, then the
/// wrapped list. Removing the current entry may pull a not-yet-visited entry
/// from a low slot into a high slot the cursor has already passed; such keys
/// are recorded and looked up again once the slot scan is over. The cursor
/// stops after yielding as many entries as the table held when it was
/// created.
#[derive(Debug)]
pub(crate) struct RawCursor<K> {
    pos: usize,
    remaining: usize,
    must_return_sentinel: bool,
    last: Last,
    wrapped: Vec<K>,
    wrapped_next: usize,
}

impl<K: Key> RawCursor<K> {
    pub(crate) fn new<V: Default>(table: &RawTable<K, V>) -> Self {
        Self {
            pos: table.n,
            remaining: table.size,
            must_return_sentinel: table.contains_sentinel_key,
            last: Last::NotStarted,
            wrapped: Vec::new(),
            wrapped_next: 0,
        }
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.remaining
    }

    /// Advances to the next occupied slot.
    pub(crate) fn next_slot<V: Default>(&mut self, table: &RawTable<K, V>) -> Option<usize> {
        if self.remaining == 0 {
            self.last = Last::Exhausted;
            return None;
        }
        self.remaining -= 1;

        if self.must_return_sentinel {
            self.must_return_sentinel = false;
            self.last = Last::Slot(table.n);
            return Some(table.n);
        }

        while self.pos > 0 {
            self.pos -= 1;
            if !table.keys[self.pos].is_sentinel() {
                self.last = Last::Slot(self.pos);
                return Some(self.pos);
            }
        }

        match self.wrapped.get(self.wrapped_next) {
            Some(key) => {
                let slot = table.locate(key);
                self.wrapped_next += 1;
                self.last = Last::Wrapped(slot);
                Some(slot)
            }
            None => {
                debug_assert!(false, "cursor ran out of entries early");
                self.remaining = 0;
                self.last = Last::Exhausted;
                None
            }
        }
    }

    /// Slot of the entry most recently returned by [`next_slot`].
    ///
    /// [`next_slot`]: RawCursor::next_slot
    pub(crate) fn current(&self) -> Result<usize, IterError> {
        match self.last {
            Last::Slot(slot) | Last::Wrapped(slot) => Ok(slot),
            Last::NotStarted => Err(IterError::NotStarted),
            Last::Removed => Err(IterError::AlreadyRemoved),
            Last::Exhausted => Err(IterError::Exhausted),
        }
    }

    /// Removes the entry most recently returned by [`next_slot`]. Never
    /// shrinks the table, since that would reorder the slots still to be
    /// scanned.
    ///
    /// [`next_slot`]: RawCursor::next_slot
    pub(crate) fn remove<V: Default>(
        &mut self,
        table: &mut RawTable<K, V>,
    ) -> Result<(K, V), IterError> {
        let removed = match self.last {
            Last::Slot(slot) => {
                let wrapped = &mut self.wrapped;
                table.remove_at_with(slot, |key| wrapped.push(key.clone()))
            }
            // Every unvisited entry is in the wrapped list by now and is found
            // by key, so further shifts cannot hide anything.
            Last::Wrapped(slot) => table.remove_at_with(slot, |_| {}),
            Last::NotStarted => return Err(IterError::NotStarted),
            Last::Removed => return Err(IterError::AlreadyRemoved),
            Last::Exhausted => return Err(IterError::Exhausted),
        };

        self.last = Last::Removed;
        Ok(removed)
    }

    /// Replaces the value of the entry most recently returned.
    pub(crate) fn set_value<V: Default>(
        &self,
        table: &mut RawTable<K, V>,
        value: V,
    ) -> Result<V, IterError> {
        let slot = self.current()?;
        Ok(mem::replace(&mut table.values[slot], value))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::collections::HashSet;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn table(expected: usize, load_factor: f32) -> RawTable<u64, u32> {
        RawTable::try_new(expected, load_factor).unwrap()
    }

    fn insert(table: &mut RawTable<u64, u32>, key: u64, value: u32) -> Option<u32> {
        match table.find(&key) {
            Probe::Found(slot) => Some(mem::replace(table.value_at_mut(slot), value)),
            Probe::Vacant(slot) => {
                table.insert_new(slot, key, value);
                None
            }
        }
    }

    fn remove(table: &mut RawTable<u64, u32>, key: u64) -> Option<u32> {
        match table.find(&key) {
            Probe::Found(slot) => Some(table.remove_at(slot, true).1),
            Probe::Vacant(_) => None,
        }
    }

    fn get(table: &RawTable<u64, u32>, key: u64) -> Option<u32> {
        match table.find(&key) {
            Probe::Found(slot) => Some(*table.value_at(slot)),
            Probe::Vacant(_) => None,
        }
    }

    /// Every stored key must be reachable from its home slot without crossing
    /// an empty slot.
    fn assert_probe_invariant(table: &RawTable<u64, u32>) {
        let mut occupied = 0;
        for slot in 0..table.n {
            let key = table.keys[slot];
            if key.is_sentinel() {
                continue;
            }
            occupied += 1;

            let mut pos = table.home(&key);
            while pos != slot {
                assert!(
                    !table.keys[pos].is_sentinel(),
                    "key {key} at slot {slot} is unreachable: slot {pos} is empty"
                );
                pos = (pos + 1) & table.mask;
            }
        }

        assert_eq!(
            occupied + usize::from(table.contains_sentinel_key),
            table.size
        );
        assert!(table.size <= table.max_fill);
        assert!(table.keys[table.n].is_sentinel());
    }

    /// Keys whose home slot is `home` in a table of the given mask.
    fn keys_with_home(table: &RawTable<u64, u32>, home: usize, count: usize) -> Vec<u64> {
        (1u64..)
            .filter(|key| table.home(key) == home)
            .take(count)
            .collect()
    }

    fn entries(table: &RawTable<u64, u32>) -> Vec<(u64, u32)> {
        let mut cursor = RawCursor::new(table);
        let mut out = Vec::new();
        while let Some(slot) = cursor.next_slot(table) {
            out.push((*table.key_at(slot), *table.value_at(slot)));
        }
        out.sort_unstable();
        out
    }

    #[test]
    fn sizing_follows_load_factor() {
        assert_eq!(array_size(4, 0.75).unwrap(), 8);
        assert_eq!(max_fill(8, 0.75), 6);
        assert_eq!(array_size(0, 0.75).unwrap(), 2);
        assert_eq!(array_size(16, 0.75).unwrap(), 32);
        assert_eq!(array_size(8, 1.0).unwrap(), 8);
        assert_eq!(max_fill(8, 1.0), 7);
        assert_eq!(max_fill(2, 0.25), 1);
        assert!(array_size(usize::MAX, 0.5).is_err());
    }

    #[test]
    fn rejects_bad_load_factors() {
        for load_factor in [0.0, -0.5, 1.5, f32::NAN, f32::INFINITY] {
            let result = RawTable::<u64, u32>::try_new(4, load_factor);
            assert!(
                matches!(result, Err(Error::InvalidLoadFactor(_))),
                "accepted {load_factor}"
            );
        }
        assert!(RawTable::<u64, u32>::try_new(4, 1.0).is_ok());
    }

    #[test]
    fn rejects_unrepresentable_sizes() {
        let result = RawTable::<u64, u32>::try_new(usize::MAX, 0.75);
        assert!(matches!(result, Err(Error::CapacityOverflow { .. })));
    }

    #[test]
    fn grows_on_seventh_insert_and_shrinks_to_floor() {
        let mut table = table(4, 0.75);
        assert_eq!(table.table_size(), 8);
        assert_eq!(table.max_fill(), 6);

        for key in 1..=6 {
            insert(&mut table, key, key as u32 * 10);
            assert_eq!(table.table_size(), 8, "resized after {key} entries");
        }

        insert(&mut table, 7, 70);
        assert_eq!(table.table_size(), 16);
        assert_eq!(table.len(), 7);
        for key in 1..=7 {
            assert_eq!(get(&table, key), Some(key as u32 * 10));
        }
        assert_probe_invariant(&table);

        let mut shrank = false;
        for key in 1..=7 {
            assert_eq!(remove(&mut table, key), Some(key as u32 * 10));
            shrank |= table.table_size() == 8;
            assert!(table.table_size() >= 8);
            assert_probe_invariant(&table);
        }
        assert!(shrank);
        assert_eq!(table.table_size(), 8);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn shrink_stops_at_construction_size() {
        let mut table = table(100, 0.75);
        let floor = table.table_size();
        for key in 1..=2000 {
            insert(&mut table, key, 0);
        }
        assert!(table.table_size() > floor);

        for key in 1..=2000 {
            remove(&mut table, key);
        }
        assert_eq!(table.len(), 0);
        assert_eq!(table.table_size(), floor);
        assert_eq!(table.min_table_size(), floor);
    }

    #[test]
    fn sentinel_key_lives_in_reserved_slot() {
        let mut table = table(4, 0.75);
        insert(&mut table, 0, 99);
        assert!(table.contains_sentinel_key());
        assert_eq!(table.find(&0), Probe::Found(table.table_size()));
        assert_eq!(get(&table, 0), Some(99));

        for key in 1..=20 {
            insert(&mut table, key, key as u32);
        }
        assert_eq!(get(&table, 0), Some(99));
        assert_probe_invariant(&table);

        assert_eq!(remove(&mut table, 0), Some(99));
        assert!(!table.contains_sentinel_key());
        assert_eq!(get(&table, 0), None);
        assert_eq!(table.len(), 20);
    }

    #[test]
    fn backward_shift_keeps_collisions_reachable() {
        let mut table = table(64, 0.75);
        let home = 5;
        let colliding = keys_with_home(&table, home, 6);
        for &key in &colliding {
            insert(&mut table, key, key as u32);
        }
        for (offset, &key) in colliding.iter().enumerate() {
            assert_eq!(table.find(&key), Probe::Found(home + offset));
        }

        remove(&mut table, colliding[1]);
        assert_probe_invariant(&table);
        for (offset, &key) in colliding.iter().enumerate().skip(2) {
            assert_eq!(table.find(&key), Probe::Found(home + offset - 1));
        }
        assert_eq!(get(&table, colliding[0]), Some(colliding[0] as u32));
        assert!(table.keys[home + 5].is_sentinel());
    }

    #[test]
    fn backward_shift_leaves_entries_at_home() {
        let mut table = table(64, 0.75);
        let first = keys_with_home(&table, 10, 2);
        let second = keys_with_home(&table, 11, 1);
        // 10: first[0], 11: first[1], 12: second[0]
        insert(&mut table, first[0], 1);
        insert(&mut table, first[1], 2);
        insert(&mut table, second[0], 3);
        assert_eq!(table.find(&second[0]), Probe::Found(12));

        remove(&mut table, first[0]);
        // first[1] moves back home, second[0] follows into 11.
        assert_eq!(table.find(&first[1]), Probe::Found(10));
        assert_eq!(table.find(&second[0]), Probe::Found(11));
        assert_probe_invariant(&table);

        remove(&mut table, first[1]);
        assert_eq!(table.find(&second[0]), Probe::Found(11));
        assert_probe_invariant(&table);
    }

    #[test]
    fn matches_reference_model() {
        let mut rng = SmallRng::seed_from_u64(0x5EED);
        let mut table = table(0, 0.75);
        let mut model = HashMap::new();

        for step in 0..20_000 {
            let key = rng.random_range(0..512u64);
            if rng.random_bool(0.55) {
                let value = rng.random::<u32>();
                assert_eq!(insert(&mut table, key, value), model.insert(key, value));
            } else {
                assert_eq!(remove(&mut table, key), model.remove(&key));
            }

            assert_eq!(table.len(), model.len());
            if step % 500 == 0 {
                assert_probe_invariant(&table);
            }
        }

        assert_probe_invariant(&table);
        for key in 0..512u64 {
            assert_eq!(get(&table, key), model.get(&key).copied());
        }
    }

    #[test]
    fn rehash_preserves_entries() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut table = table(16, 0.5);
        for _ in 0..300 {
            let key = rng.random::<u64>() % 10_000;
            insert(&mut table, key, rng.random());
        }
        insert(&mut table, 0, 42);

        let before = entries(&table);
        let size = table.table_size();
        table.try_rehash(size * 4).unwrap();
        assert_eq!(table.table_size(), size * 4);
        assert_eq!(entries(&table), before);
        assert_probe_invariant(&table);

        let trimmed_size = array_size(table.len(), table.load_factor()).unwrap();
        table.try_rehash(trimmed_size).unwrap();
        assert_eq!(table.table_size(), trimmed_size);
        assert_eq!(entries(&table), before);
        assert_probe_invariant(&table);
    }

    #[test]
    fn trim_may_go_below_the_floor() {
        let mut table = table(1000, 0.75);
        let floor = table.table_size();
        for key in 1..=10 {
            insert(&mut table, key, 1);
        }

        assert!(table.trim_to(table.len()));
        assert_eq!(table.table_size(), 16);
        assert_eq!(table.min_table_size(), floor);
        for key in 1..=10 {
            assert_eq!(get(&table, key), Some(1));
        }

        // Never below what the current entries need.
        assert!(table.trim_to(0));
        assert_eq!(table.table_size(), 16);

        // Asking for more than is allocated is a successful no-op.
        assert!(table.trim_to(1 << 20));
        assert_eq!(table.table_size(), 16);
    }

    #[test]
    fn trim_below_len_fits_current_entries() {
        let mut table = table(1000, 0.75);
        assert_eq!(table.table_size(), 2048);
        for key in 1..=10 {
            insert(&mut table, key, key as u32);
        }

        assert!(table.trim_to(0));
        assert_eq!(table.table_size(), 16);
        assert_eq!(table.len(), 10);
        for key in 1..=10 {
            assert_eq!(get(&table, key), Some(key as u32));
        }
    }

    #[test]
    fn ensure_capacity_grows_once() {
        let mut table = table(0, 0.75);
        table.try_ensure_capacity(1000).unwrap();
        let size = table.table_size();
        assert!(table.max_fill() >= 1000);
        for key in 1..=1000 {
            insert(&mut table, key, 0);
        }
        assert_eq!(table.table_size(), size);
    }

    #[test]
    fn clear_keeps_table_size() {
        let mut table = table(0, 0.75);
        for key in 0..100 {
            insert(&mut table, key, 1);
        }
        let size = table.table_size();
        table.clear();
        assert_eq!(table.len(), 0);
        assert!(!table.contains_sentinel_key());
        assert_eq!(table.table_size(), size);
        assert!(table.keys.iter().all(|key| key.is_sentinel()));
        assert_eq!(get(&table, 0), None);
    }

    #[test]
    fn cursor_visits_sentinel_first() {
        let mut table = table(8, 0.75);
        insert(&mut table, 3, 3);
        insert(&mut table, 0, 0);
        insert(&mut table, 9, 9);

        let mut cursor = RawCursor::new(&table);
        assert_eq!(cursor.next_slot(&table), Some(table.table_size()));
        assert_eq!(cursor.remaining(), 2);
        assert!(cursor.next_slot(&table).is_some());
        assert!(cursor.next_slot(&table).is_some());
        assert_eq!(cursor.next_slot(&table), None);
        assert_eq!(cursor.current(), Err(IterError::Exhausted));
    }

    #[test]
    fn cursor_protocol_errors() {
        let mut table = table(8, 0.75);
        insert(&mut table, 1, 1);

        let mut cursor = RawCursor::new(&table);
        assert_eq!(cursor.remove(&mut table), Err(IterError::NotStarted));
        assert_eq!(cursor.set_value(&mut table, 5), Err(IterError::NotStarted));

        cursor.next_slot(&table).unwrap();
        assert_eq!(cursor.set_value(&mut table, 5), Ok(1));
        assert_eq!(cursor.remove(&mut table), Ok((1, 5)));
        assert_eq!(cursor.remove(&mut table), Err(IterError::AlreadyRemoved));
        assert_eq!(cursor.set_value(&mut table, 6), Err(IterError::AlreadyRemoved));

        assert_eq!(cursor.next_slot(&table), None);
        assert_eq!(cursor.remove(&mut table), Err(IterError::Exhausted));
    }

    /// Fills the top slot's cluster so that it wraps around to slot 0 and
    /// beyond, then removes entries through the cursor. Entries shifted from
    /// the bottom of the table into the top must still be visited.
    #[test]
    fn cursor_removal_handles_wraparound() {
        let mut table = table(64, 0.75);
        let top = table.mask;
        let wrapping = keys_with_home(&table, top, 5);
        let low = keys_with_home(&table, 1, 2);
        for &key in wrapping.iter().chain(low.iter()) {
            insert(&mut table, key, key as u32);
        }
        for key in 1000..1020 {
            insert(&mut table, key, key as u32);
        }
        insert(&mut table, 0, 0);
        // The cluster starting at the top slot spills over into slots 0..4.
        assert_eq!(table.find(&wrapping[4]), Probe::Found(3));

        let before = entries(&table);
        let size = table.table_size();
        let mut cursor = RawCursor::new(&table);
        let mut seen = Vec::new();
        while let Some(slot) = cursor.next_slot(&table) {
            let key = *table.key_at(slot);
            seen.push(key);
            cursor.remove(&mut table).unwrap();
            assert_probe_invariant(&table);
        }

        assert!(!cursor.wrapped.is_empty(), "no entry was shifted behind the cursor");
        assert_eq!(table.len(), 0);
        assert_eq!(table.table_size(), size, "cursor removal must not shrink");

        let unique: HashSet<u64> = seen.iter().copied().collect();
        assert_eq!(unique.len(), seen.len(), "an entry was visited twice");
        let mut seen = seen;
        seen.sort_unstable();
        assert_eq!(seen, before.iter().map(|(k, _)| *k).collect::<Vec<_>>());
    }

    #[test]
    fn cursor_removing_some_entries_visits_the_rest_once() {
        let mut rng = SmallRng::seed_from_u64(99);
        for round in 0..50 {
            let mut table = table(32, 0.75);
            let top = table.mask;
            for key in keys_with_home(&table, top, 4) {
                insert(&mut table, key, 0);
            }
            for _ in 0..18 {
                insert(&mut table, rng.random_range(1..10_000), 0);
            }

            let before: Vec<u64> = entries(&table).into_iter().map(|(k, _)| k).collect();
            let mut cursor = RawCursor::new(&table);
            let mut seen = Vec::new();
            let mut kept = Vec::new();
            while let Some(slot) = cursor.next_slot(&table) {
                let key = *table.key_at(slot);
                seen.push(key);
                if rng.random_bool(0.5) {
                    cursor.remove(&mut table).unwrap();
                } else {
                    kept.push(key);
                }
            }

            seen.sort_unstable();
            assert_eq!(seen, before, "round {round}");
            kept.sort_unstable();
            let remaining: Vec<u64> = entries(&table).into_iter().map(|(k, _)| k).collect();
            assert_eq!(remaining, kept, "round {round}");
            assert_probe_invariant(&table);
        }
    }

    #[test]
    fn probe_stats_account_for_every_entry() {
        let mut table = table(0, 0.75);
        for key in 0..500 {
            insert(&mut table, key, 0);
        }
        let stats = table.probe_stats();
        assert_eq!(stats.populated, 500);
        assert_eq!(stats.histogram.iter().sum::<usize>(), 500);
        assert_eq!(stats.longest_probe + 1, stats.histogram.len());
        assert!(stats.mean_probe() >= 0.0);
    }
}
