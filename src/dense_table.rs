//! A hash table engine with densely stored entries and a robin-hood
//! probed metadata index.
//!
//! All live entries sit contiguously in insertion order in one `Vec`; a
//! separate power-of-two array of metadata slots references them by
//! position. Each slot packs a `dist_and_fingerprint` word (upper 24 bits
//! the displacement from the home bucket plus one, low 8 bits a hash
//! fingerprint) next to a 32-bit entry index. The all-zero record marks
//! an empty slot, which is what makes a freshly zeroed bucket array
//! valid.
//!
//! ## Design
//!
//! An entry's home bucket is `hash >> shifts`, so the bucket count is
//! always `2^(64 - shifts)` and growth is a single decrement of
//! `shifts`. Probing is linear with wraparound under the robin-hood
//! discipline: along any probe run displacements never decrease, so a
//! probe can stop as soon as its own displacement exceeds the resident
//! slot's. Insertion shifts richer residents up one slot at a time until
//! an empty slot absorbs the tail; removal slides successors backward
//! until one is already at its home bucket, which keeps the table free
//! of tombstones.
//!
//! Because the index stores positions rather than pointers, removing an
//! entry fills the hole in the entry array by swapping in the last entry
//! and re-pointing the one slot that referenced it. The entry array
//! stays dense at all times and iteration is a plain slice walk. On
//! growth the old bucket array is dropped before the doubled one is
//! allocated and the index is rebuilt from the entry array in order; the
//! entries themselves never move, so growth cannot disturb iteration
//! order.
//!
//! The displacement field is compared as part of the whole
//! `dist_and_fingerprint` word. Probing therefore rejects almost every
//! non-matching slot on a single `u32` compare and only calls the
//! equality predicate when both the displacement and the 8-bit
//! fingerprint agree.
//!
//! [`DenseTable<V>`] is a fairly low-level structure: operations take a
//! precomputed 64-bit hash plus `eq`/`rehash` closures, and the hash
//! must already be finalized (see [`MixHash`](crate::hash::MixHash)).
//! Prefer [`DenseMap`](crate::DenseMap) or [`DenseSet`](crate::DenseSet)
//! unless you are building your own map or set flavor.
//!
//! ## Invariants
//!
//! 1. Exactly `len` slots are non-empty and their entry indices form a
//!    permutation of `0..len`.
//! 2. For every non-empty slot, walking from the home bucket of its
//!    entry's hash to the slot (with wraparound) takes exactly
//!    `(dist_and_fingerprint >> 8) - 1` steps, and the low byte equals
//!    the low byte of that hash.
//! 3. Scanning forward from any bucket, displacements are non-decreasing
//!    until the first empty slot or a strict drop, which bounds every
//!    probe.
//! 4. `len <= max_bucket_capacity` whenever the caller can observe the
//!    table (a lowered max load factor is repaired on the next insert).

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::fmt::Debug;
use core::mem;
use core::ops::Range;

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "load-ninety")] {
        const DEFAULT_MAX_LOAD_FACTOR: f32 = 0.9;
    } else {
        const DEFAULT_MAX_LOAD_FACTOR: f32 = 0.8;
    }
}

/// One displacement step in the packed `dist_and_fingerprint` word; the
/// low byte below it is the fingerprint.
const DIST_INC: u32 = 1 << 8;
const FINGERPRINT_MASK: u32 = DIST_INC - 1;

/// Shift amount of an empty table: `2^(64 - 61)` = 8 buckets on first
/// allocation.
const INITIAL_SHIFTS: u8 = 64 - 3;

/// Entry indices are stored in 32 bits, so the table holds at most
/// `2^32 - 1` entries.
const MAX_ENTRIES: usize = u32::MAX as usize;

/// A metadata slot. The zeroed record is an empty slot; `value_idx` is
/// meaningful only when `dist_and_fingerprint` is non-zero.
#[derive(Clone, Copy, Default)]
struct Bucket {
    dist_and_fingerprint: u32,
    value_idx: u32,
}

/// A hash table engine storing entries of type `V` densely, in insertion
/// order.
///
/// `DenseTable<V>` provides fast insertion, lookup, and removal, but
/// requires the caller to provide a finalized 64-bit hash and an
/// equality predicate for each operation, plus a `rehash` closure for
/// operations that may need to re-derive an entry's hash (growth and the
/// swap-with-last fixup on removal). The closures must be consistent:
/// `rehash` must return the same hash that was originally supplied for
/// an entry, and `eq` must agree with it.
///
/// A panic in a caller-supplied closure can leave the table with entries
/// the index does not reference. The table remains memory-safe to use
/// and drop, but lookups are unreliable afterwards, as with a panicking
/// `Hash` impl in the std collections.
#[derive(Clone)]
pub struct DenseTable<V> {
    entries: Vec<V>,
    buckets: Box<[Bucket]>,
    max_bucket_capacity: usize,
    max_load_factor: f32,
    shifts: u8,
}

impl<V> Default for DenseTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Debug for DenseTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let metadata: Vec<String> = self
            .buckets
            .iter()
            .map(|bucket| {
                if bucket.dist_and_fingerprint == 0 {
                    String::from(".")
                } else {
                    format!(
                        "{:02}x{:02x}>{}",
                        bucket.dist_and_fingerprint >> 8,
                        bucket.dist_and_fingerprint & FINGERPRINT_MASK,
                        bucket.value_idx
                    )
                }
            })
            .collect();

        f.debug_struct("DenseTable")
            .field("len", &self.entries.len())
            .field("capacity", &self.max_bucket_capacity)
            .field("metadata", &metadata)
            .finish()
    }
}

impl<V> DenseTable<V> {
    /// Creates an empty table.
    ///
    /// No memory is allocated until the first insertion.
    pub fn new() -> Self {
        DenseTable {
            entries: Vec::new(),
            buckets: Box::default(),
            max_bucket_capacity: 0,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            shifts: INITIAL_SHIFTS,
        }
    }

    /// Creates a table that can hold at least `capacity` entries without
    /// growing its bucket array.
    ///
    /// The bucket count is the smallest power of two whose capacity at
    /// the default max load factor covers `capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut table = Self::new();
        if capacity > 0 {
            table.shifts = table.calc_shifts_for_size(capacity);
            table.allocate_buckets();
        }
        table
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table contains no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of entries the table can hold before the next
    /// growth.
    pub fn capacity(&self) -> usize {
        self.max_bucket_capacity
    }

    /// Returns the current number of metadata buckets. Always zero or a
    /// power of two.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the ratio of entries to buckets.
    pub fn load_factor(&self) -> f32 {
        if self.buckets.is_empty() {
            0.0
        } else {
            self.entries.len() as f32 / self.buckets.len() as f32
        }
    }

    /// Returns the load factor at which the table grows.
    pub fn max_load_factor(&self) -> f32 {
        self.max_load_factor
    }

    /// Sets the load factor at which the table grows and recomputes the
    /// current capacity from it.
    ///
    /// Lowering the factor below the current load does not reshape the
    /// table; the next insertion grows it instead.
    ///
    /// # Panics
    ///
    /// Panics unless `0.0 < max_load_factor <= 1.0`.
    pub fn set_max_load_factor(&mut self, max_load_factor: f32) {
        assert!(
            max_load_factor > 0.0 && max_load_factor <= 1.0,
            "max load factor must be in (0, 1]"
        );
        self.max_load_factor = max_load_factor;
        if !self.buckets.is_empty() {
            self.update_capacity();
        }
    }

    /// Returns the entries as a slice, in insertion order (modulo
    /// swap-with-last removals).
    pub fn as_slice(&self) -> &[V] {
        &self.entries
    }

    /// Returns a reference to the entry at `index` in iteration order.
    pub fn get_index(&self, index: usize) -> Option<&V> {
        self.entries.get(index)
    }

    /// Returns a mutable reference to the entry at `index`.
    ///
    /// The parts of the entry that feed its hash and equality must not
    /// be modified through this reference; doing so leaves the index
    /// pointing at a key it can no longer find.
    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut V> {
        self.entries.get_mut(index)
    }

    /// Returns an iterator over the entries in iteration order.
    pub fn iter(&self) -> core::slice::Iter<'_, V> {
        self.entries.iter()
    }

    /// Returns a mutable iterator over the entries.
    ///
    /// The same caveat as [`get_index_mut`](Self::get_index_mut)
    /// applies.
    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, V> {
        self.entries.iter_mut()
    }

    /// Removes all entries, keeping the allocated bucket array.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.buckets.fill(Bucket::default());
    }

    /// Removes and yields all entries in iteration order.
    ///
    /// Leaking the iterator leaks the unyielded entries but leaves the
    /// table empty and consistent.
    pub fn drain(&mut self) -> alloc::vec::Drain<'_, V> {
        self.buckets.fill(Bucket::default());
        self.entries.drain(..)
    }

    #[inline]
    fn next_bucket(&self, bucket_idx: usize) -> usize {
        let next = bucket_idx + 1;
        if next == self.buckets.len() {
            0
        } else {
            next
        }
    }

    #[inline]
    fn home_bucket(&self, hash: u64) -> usize {
        (hash >> self.shifts) as usize
    }

    #[inline]
    fn dist_and_fingerprint(hash: u64) -> u32 {
        DIST_INC | (hash as u32 & FINGERPRINT_MASK)
    }

    fn bucket_count_for(shifts: u8) -> u64 {
        1u64 << (64 - u32::from(shifts))
    }

    fn calc_shifts_for_size(&self, size: usize) -> u8 {
        let mut shifts = INITIAL_SHIFTS;
        while shifts > 1
            && ((Self::bucket_count_for(shifts) as f64 * f64::from(self.max_load_factor)) as u64)
                < size as u64
        {
            shifts -= 1;
        }
        shifts
    }

    fn update_capacity(&mut self) {
        self.max_bucket_capacity =
            (self.buckets.len() as f64 * f64::from(self.max_load_factor)) as usize;
    }

    fn allocate_buckets(&mut self) {
        let num_buckets = Self::bucket_count_for(self.shifts) as usize;
        self.buckets = vec![Bucket::default(); num_buckets].into_boxed_slice();
        self.update_capacity();
    }

    fn deallocate_buckets(&mut self) {
        self.buckets = Box::default();
        self.max_bucket_capacity = 0;
    }

    /// Walks from the home bucket of `hash` past every slot that a probe
    /// for it would skip, returning the first candidate position.
    fn next_while_less(&self, hash: u64) -> (u32, usize) {
        let mut dist_and_fingerprint = Self::dist_and_fingerprint(hash);
        let mut bucket_idx = self.home_bucket(hash);
        while dist_and_fingerprint < self.buckets[bucket_idx].dist_and_fingerprint {
            dist_and_fingerprint += DIST_INC;
            bucket_idx = self.next_bucket(bucket_idx);
        }
        (dist_and_fingerprint, bucket_idx)
    }

    /// Writes `bucket` at `place`, shifting any residents up one slot at
    /// a time until an empty slot absorbs the tail.
    fn place_and_shift_up(&mut self, mut bucket: Bucket, mut place: usize) {
        while self.buckets[place].dist_and_fingerprint != 0 {
            bucket = mem::replace(&mut self.buckets[place], bucket);
            bucket.dist_and_fingerprint += DIST_INC;
            place = self.next_bucket(place);
        }
        self.buckets[place] = bucket;
    }

    fn fill_buckets_from_entries(&mut self, rehash: &dyn Fn(&V) -> u64) {
        for index in 0..self.entries.len() {
            let hash = rehash(&self.entries[index]);
            let (dist_and_fingerprint, bucket_idx) = self.next_while_less(hash);
            // Entries are known to be distinct here, so no equality
            // checks are needed.
            self.place_and_shift_up(
                Bucket {
                    dist_and_fingerprint,
                    value_idx: index as u32,
                },
                bucket_idx,
            );
        }
    }

    fn is_full(&self) -> bool {
        self.entries.len() >= self.max_bucket_capacity
    }

    fn increase_size(&mut self, rehash: &dyn Fn(&V) -> u64) {
        if self.buckets.is_empty() {
            self.allocate_buckets();
        } else {
            self.shifts -= 1;
            // Drop the old bucket array before allocating the doubled
            // one; the index is rebuilt from `entries`, so the two never
            // need to coexist.
            self.deallocate_buckets();
            self.allocate_buckets();
        }
        self.fill_buckets_from_entries(rehash);
    }

    /// Looks up an entry by hash and predicate, returning its position
    /// in the entry array.
    pub fn find_index(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }

        let mut dist_and_fingerprint = Self::dist_and_fingerprint(hash);
        let mut bucket_idx = self.home_bucket(hash);

        // The first two probes are checked without the early-out; the
        // loop takes over from the third.
        for _ in 0..2 {
            let bucket = self.buckets[bucket_idx];
            if dist_and_fingerprint == bucket.dist_and_fingerprint
                && eq(&self.entries[bucket.value_idx as usize])
            {
                return Some(bucket.value_idx as usize);
            }
            dist_and_fingerprint += DIST_INC;
            bucket_idx = self.next_bucket(bucket_idx);
        }

        loop {
            let bucket = self.buckets[bucket_idx];
            if dist_and_fingerprint == bucket.dist_and_fingerprint
                && eq(&self.entries[bucket.value_idx as usize])
            {
                return Some(bucket.value_idx as usize);
            }
            dist_and_fingerprint += DIST_INC;
            bucket_idx = self.next_bucket(bucket_idx);
            if dist_and_fingerprint > self.buckets[bucket_idx].dist_and_fingerprint {
                return None;
            }
        }
    }

    /// Looks up an entry by hash and predicate.
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        self.find_index(hash, eq).map(|index| &self.entries[index])
    }

    /// Looks up an entry by hash and predicate, mutably.
    ///
    /// The same caveat as [`get_index_mut`](Self::get_index_mut)
    /// applies.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        self.find_index(hash, eq)
            .map(move |index| &mut self.entries[index])
    }

    /// Probes for an entry without constructing anything, returning a
    /// view that is either occupied or vacant.
    ///
    /// Nothing is written to the table when the entry exists; a vacant
    /// view inserts with a single placement. Growth happens up front
    /// when the table is at capacity, which is the only use of `rehash`
    /// here.
    pub fn entry(
        &mut self,
        hash: u64,
        eq: impl Fn(&V) -> bool,
        rehash: impl Fn(&V) -> u64,
    ) -> Entry<'_, V> {
        if self.is_full() {
            self.increase_size(&rehash);
        }

        let mut dist_and_fingerprint = Self::dist_and_fingerprint(hash);
        let mut bucket_idx = self.home_bucket(hash);

        while dist_and_fingerprint <= self.buckets[bucket_idx].dist_and_fingerprint {
            let bucket = self.buckets[bucket_idx];
            if dist_and_fingerprint == bucket.dist_and_fingerprint
                && eq(&self.entries[bucket.value_idx as usize])
            {
                return Entry::Occupied(OccupiedEntry {
                    table: self,
                    bucket_idx,
                });
            }
            dist_and_fingerprint += DIST_INC;
            bucket_idx = self.next_bucket(bucket_idx);
        }

        Entry::Vacant(VacantEntry {
            table: self,
            dist_and_fingerprint,
            bucket_idx,
        })
    }

    /// Inserts speculatively: the entry is pushed onto the entry array
    /// first and popped back off if probing finds an equal entry.
    ///
    /// Returns the position of the entry with this identity and, on a
    /// duplicate, gives the rejected new entry back to the caller. `eq`
    /// receives the new entry and an existing candidate, in that order.
    ///
    /// # Panics
    ///
    /// Panics if the table already holds `2^32 - 1` entries.
    pub fn insert(
        &mut self,
        hash: u64,
        value: V,
        eq: impl Fn(&V, &V) -> bool,
        rehash: impl Fn(&V) -> u64,
    ) -> (usize, Option<V>) {
        if self.is_full() {
            self.increase_size(&rehash);
        }

        assert!(
            self.entries.len() < MAX_ENTRIES,
            "dense table holds at most 2^32 - 1 entries"
        );
        self.entries.push(value);
        let new_idx = self.entries.len() - 1;

        let mut dist_and_fingerprint = Self::dist_and_fingerprint(hash);
        let mut bucket_idx = self.home_bucket(hash);

        while dist_and_fingerprint <= self.buckets[bucket_idx].dist_and_fingerprint {
            let bucket = self.buckets[bucket_idx];
            if dist_and_fingerprint == bucket.dist_and_fingerprint
                && eq(
                    &self.entries[new_idx],
                    &self.entries[bucket.value_idx as usize],
                )
            {
                let rejected = self.entries.pop();
                return (bucket.value_idx as usize, rejected);
            }
            dist_and_fingerprint += DIST_INC;
            bucket_idx = self.next_bucket(bucket_idx);
        }

        self.place_and_shift_up(
            Bucket {
                dist_and_fingerprint,
                value_idx: new_idx as u32,
            },
            bucket_idx,
        );
        (new_idx, None)
    }

    /// Removes the slot at `bucket_idx` and its entry, repairing both
    /// arrays.
    fn erase_bucket(&mut self, mut bucket_idx: usize, rehash: &dyn Fn(&V) -> u64) -> V {
        let value_idx = self.buckets[bucket_idx].value_idx as usize;

        // Backward shift: slide successors down one slot until one is
        // empty or already at its home bucket.
        let mut next_idx = self.next_bucket(bucket_idx);
        while self.buckets[next_idx].dist_and_fingerprint >= DIST_INC * 2 {
            self.buckets[bucket_idx] = Bucket {
                dist_and_fingerprint: self.buckets[next_idx].dist_and_fingerprint - DIST_INC,
                value_idx: self.buckets[next_idx].value_idx,
            };
            bucket_idx = next_idx;
            next_idx = self.next_bucket(next_idx);
        }
        self.buckets[bucket_idx] = Bucket::default();

        // The last entry is about to be swapped into the hole; find the
        // one slot that references it and re-point it. Its probe chain
        // from the home bucket is contiguous, so the walk cannot cross
        // an empty slot.
        let last_idx = self.entries.len() - 1;
        if value_idx != last_idx {
            let hash = rehash(&self.entries[last_idx]);
            let mut idx = self.home_bucket(hash);
            while self.buckets[idx].value_idx as usize != last_idx {
                idx = self.next_bucket(idx);
            }
            self.buckets[idx].value_idx = value_idx as u32;
        }

        self.entries.swap_remove(value_idx)
    }

    /// Removes an entry by hash and predicate, returning it on a hit.
    pub fn remove(
        &mut self,
        hash: u64,
        eq: impl Fn(&V) -> bool,
        rehash: impl Fn(&V) -> u64,
    ) -> Option<V> {
        if self.entries.is_empty() {
            return None;
        }

        let (mut dist_and_fingerprint, mut bucket_idx) = self.next_while_less(hash);
        while dist_and_fingerprint == self.buckets[bucket_idx].dist_and_fingerprint
            && !eq(&self.entries[self.buckets[bucket_idx].value_idx as usize])
        {
            dist_and_fingerprint += DIST_INC;
            bucket_idx = self.next_bucket(bucket_idx);
        }

        if dist_and_fingerprint != self.buckets[bucket_idx].dist_and_fingerprint {
            return None;
        }
        Some(self.erase_bucket(bucket_idx, &rehash))
    }

    /// Removes the entry at `index` in iteration order.
    ///
    /// The last entry is swapped into `index`, so the entry that was
    /// last in iteration order takes the removed entry's position.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove_index(&mut self, index: usize, rehash: impl Fn(&V) -> u64) -> V {
        let hash = rehash(&self.entries[index]);
        let mut bucket_idx = self.home_bucket(hash);
        while self.buckets[bucket_idx].value_idx as usize != index {
            bucket_idx = self.next_bucket(bucket_idx);
        }
        self.erase_bucket(bucket_idx, &rehash)
    }

    /// Removes every entry in `range` (positions in iteration order).
    ///
    /// Equivalent to removing the entries one at a time, but ordered so
    /// that entries which are themselves doomed are never swapped into
    /// an earlier hole: positions up to the split point are removed
    /// front to back (each swap pulls in an entry from beyond the
    /// range), the rest back to front (each is the last entry by then).
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn remove_range(&mut self, range: Range<usize>, rehash: impl Fn(&V) -> u64) {
        let Range { start, end } = range;
        assert!(
            start <= end && end <= self.entries.len(),
            "range out of bounds"
        );

        let mid = start + (end - start).min(self.entries.len() - end);
        for index in start..mid {
            self.remove_index(index, &rehash);
        }
        let mut index = end;
        while index > mid {
            index -= 1;
            self.remove_index(index, &rehash);
        }
    }

    /// Keeps only the entries for which `keep` returns `true`.
    ///
    /// Scans back to front so every swap pulls in an entry that has
    /// already been judged.
    pub fn retain(&mut self, mut keep: impl FnMut(&mut V) -> bool, rehash: impl Fn(&V) -> u64) {
        let mut index = self.entries.len();
        while index > 0 {
            index -= 1;
            if !keep(&mut self.entries[index]) {
                self.remove_index(index, &rehash);
            }
        }
    }

    /// Grows the bucket array, if needed, to hold `len + additional`
    /// entries without further growth.
    ///
    /// Never shrinks anything.
    pub fn reserve(&mut self, additional: usize, rehash: impl Fn(&V) -> u64) {
        let required = self.entries.len().saturating_add(additional);
        let shifts = self.calc_shifts_for_size(required);
        if shifts < self.shifts || (self.buckets.is_empty() && required > 0) {
            self.shifts = shifts;
            self.deallocate_buckets();
            self.allocate_buckets();
            self.fill_buckets_from_entries(&rehash);
        }
    }

    /// Resizes the bucket array to the smallest power of two that holds
    /// `count.max(len)` entries under the max load factor, and shrinks
    /// the entry array's backing allocation.
    ///
    /// `rehash_to(0)` is the canonical shrink-to-fit.
    pub fn rehash_to(&mut self, count: usize, rehash: impl Fn(&V) -> u64) {
        let target = count.max(self.entries.len());
        self.entries.shrink_to_fit();
        let shifts = self.calc_shifts_for_size(target);
        if shifts != self.shifts {
            self.shifts = shifts;
            self.deallocate_buckets();
            self.allocate_buckets();
            self.fill_buckets_from_entries(&rehash);
        }
    }
}

impl<V> IntoIterator for DenseTable<V> {
    type Item = V;
    type IntoIter = alloc::vec::IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a DenseTable<V> {
    type Item = &'a V;
    type IntoIter = core::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A view into a single position of a [`DenseTable`], which may be
/// vacant or occupied.
///
/// Constructed by [`DenseTable::entry`].
pub enum Entry<'a, V> {
    /// No entry with the probed identity is present.
    Vacant(VacantEntry<'a, V>),
    /// An entry with the probed identity is present.
    Occupied(OccupiedEntry<'a, V>),
}

/// A view into a vacant position of a [`DenseTable`].
pub struct VacantEntry<'a, V> {
    table: &'a mut DenseTable<V>,
    dist_and_fingerprint: u32,
    bucket_idx: usize,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts an entry at the probed position and returns a mutable
    /// reference to it.
    ///
    /// # Panics
    ///
    /// Panics if the table already holds `2^32 - 1` entries.
    pub fn insert(self, value: V) -> &'a mut V {
        let table = self.table;
        assert!(
            table.entries.len() < MAX_ENTRIES,
            "dense table holds at most 2^32 - 1 entries"
        );
        table.entries.push(value);
        let value_idx = (table.entries.len() - 1) as u32;
        table.place_and_shift_up(
            Bucket {
                dist_and_fingerprint: self.dist_and_fingerprint,
                value_idx,
            },
            self.bucket_idx,
        );
        &mut table.entries[value_idx as usize]
    }
}

/// A view into an occupied position of a [`DenseTable`].
pub struct OccupiedEntry<'a, V> {
    table: &'a mut DenseTable<V>,
    bucket_idx: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Returns the entry's position in iteration order.
    pub fn index(&self) -> usize {
        self.table.buckets[self.bucket_idx].value_idx as usize
    }

    /// Returns a reference to the entry.
    pub fn get(&self) -> &V {
        &self.table.entries[self.index()]
    }

    /// Returns a mutable reference to the entry.
    ///
    /// The parts of the entry that feed its hash and equality must not
    /// be modified.
    pub fn get_mut(&mut self) -> &mut V {
        let index = self.index();
        &mut self.table.entries[index]
    }

    /// Converts the view into a mutable reference with the lifetime of
    /// the borrow.
    pub fn into_mut(self) -> &'a mut V {
        let index = self.index();
        &mut self.table.entries[index]
    }

    /// Removes the entry from the table and returns it.
    ///
    /// `rehash` re-derives the hash of the entry swapped into the hole.
    pub fn remove(self, rehash: impl Fn(&V) -> u64) -> V {
        let bucket_idx = self.bucket_idx;
        self.table.erase_bucket(bucket_idx, &rehash)
    }
}

cfg_if! {
    if #[cfg(feature = "stats")] {
        /// Debug statistics for table analysis.
        #[derive(Debug, Clone)]
        pub struct DebugStats {
            /// Number of entries currently in the table.
            pub len: usize,
            /// Maximum number of entries before the next growth.
            pub capacity: usize,
            /// Number of metadata buckets.
            pub bucket_count: usize,
            /// Load factor (`len / bucket_count`).
            pub load_factor: f64,
            /// Largest displacement of any slot from its home bucket.
            pub max_displacement: usize,
            /// Mean displacement over all occupied slots.
            pub mean_displacement: f64,
            /// Bytes held by the metadata array.
            pub metadata_bytes: usize,
            /// Bytes held by the entry array's backing allocation.
            pub entry_bytes: usize,
        }

        #[cfg(feature = "std")]
        impl DebugStats {
            /// Pretty-print the statistics.
            pub fn print(&self) {
                println!("=== Dense Table Debug Statistics ===");
                println!(
                    "Population: {}/{} in {} buckets ({:.2}% load factor)",
                    self.len,
                    self.capacity,
                    self.bucket_count,
                    self.load_factor * 100.0
                );
                println!(
                    "Displacement: max {}, mean {:.3}",
                    self.max_displacement, self.mean_displacement
                );
                println!(
                    "Memory: {} metadata bytes, {} entry bytes",
                    self.metadata_bytes, self.entry_bytes
                );
            }
        }

        impl<V> DenseTable<V> {
            /// Returns a histogram of slot displacements: index `d` counts
            /// the occupied slots sitting `d` buckets past their home.
            pub fn displacement_histogram(&self) -> Vec<usize> {
                let mut histogram = Vec::new();
                for bucket in self.buckets.iter() {
                    if bucket.dist_and_fingerprint == 0 {
                        continue;
                    }
                    let displacement = (bucket.dist_and_fingerprint >> 8) as usize - 1;
                    if histogram.len() <= displacement {
                        histogram.resize(displacement + 1, 0);
                    }
                    histogram[displacement] += 1;
                }
                histogram
            }

            /// Pretty-print the displacement histogram.
            #[cfg(feature = "std")]
            pub fn print_displacement_histogram(&self) {
                let histogram = self.displacement_histogram();
                let max = histogram.iter().copied().max().unwrap_or(0);
                if max == 0 {
                    println!("displacement histogram: empty");
                    return;
                }
                println!(
                    "displacement histogram ({} entries, {} buckets):",
                    self.entries.len(),
                    self.buckets.len()
                );
                for (displacement, &count) in histogram.iter().enumerate() {
                    let bar = "#".repeat((count * 60).div_ceil(max));
                    println!("{:>3} | {} ({})", displacement, bar, count);
                }
            }

            /// Collects [`DebugStats`] for the current state.
            pub fn debug_stats(&self) -> DebugStats {
                let mut max_displacement = 0usize;
                let mut total_displacement = 0usize;
                let mut occupied = 0usize;
                for bucket in self.buckets.iter() {
                    if bucket.dist_and_fingerprint == 0 {
                        continue;
                    }
                    let displacement = (bucket.dist_and_fingerprint >> 8) as usize - 1;
                    max_displacement = max_displacement.max(displacement);
                    total_displacement += displacement;
                    occupied += 1;
                }

                DebugStats {
                    len: self.entries.len(),
                    capacity: self.max_bucket_capacity,
                    bucket_count: self.buckets.len(),
                    load_factor: if self.buckets.is_empty() {
                        0.0
                    } else {
                        self.entries.len() as f64 / self.buckets.len() as f64
                    },
                    max_displacement,
                    mean_displacement: if occupied == 0 {
                        0.0
                    } else {
                        total_displacement as f64 / occupied as f64
                    },
                    metadata_bytes: self.buckets.len() * mem::size_of::<Bucket>(),
                    entry_bytes: self.entries.capacity() * mem::size_of::<V>(),
                }
            }
        }
    }
}
