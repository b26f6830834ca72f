//! Structural layer: an insertion-ordered hash map with stable handles.
//!
//! Storage is split three ways:
//! - `slots`: generational storage (`SlotMap`), so a `Handle` held across
//!   removals can never alias a newer entry that reuses the physical slot.
//! - `index`: a `hashbrown::HashTable` from key hash to slot. Each entry
//!   stores its precomputed `u64` hash and indexing always uses the stored
//!   hash, so `K: Hash` never runs again after insertion.
//! - `order`: a `BTreeMap` from insertion sequence to slot. Sequences are
//!   monotonic and never reused, which gives external cursors a stable
//!   notion of "next entry" even while entries are inserted and removed
//!   between steps.
//!
//! Replacing the value of an existing key keeps the entry's sequence, so an
//! overwritten key keeps its position in iteration order.

use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;
use std::collections::BTreeMap;

/// Stable reference to one entry. Survives unrelated mutations; resolves to
/// nothing once its entry is removed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct Handle(DefaultKey);

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
    seq: u64,
}

pub(crate) struct OrderedHashMap<K, V, S = RandomState> {
    hasher: S,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Entry<K, V>>,
    order: BTreeMap<u64, DefaultKey>,
    next_seq: u64,
}

impl<K, V> OrderedHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V> Default for OrderedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> OrderedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            index: HashTable::new(),
            slots: SlotMap::with_key(),
            order: BTreeMap::new(),
            next_seq: 0,
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn find<Q>(&self, q: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.index
            .find(hash, |&k| {
                self.slots
                    .get(k)
                    .map(|e| e.key.borrow() == q)
                    .unwrap_or(false)
            })
            .map(|&k| Handle(k))
    }

    /// Inserts `value` under `key`, or replaces the value in place if the
    /// key is already present. A replaced key keeps its insertion sequence
    /// (and therefore its iteration position); the previous value is
    /// returned to the caller so any teardown runs outside this map.
    pub fn insert(&mut self, key: K, value: V) -> (Handle, Option<V>) {
        let hash = self.make_hash(&key);
        match self.index.entry(
            hash,
            |&kk| self.slots.get(kk).map(|e| e.key == key).unwrap_or(false),
            |&kk| self.slots.get(kk).map(|e| e.hash).unwrap_or(0),
        ) {
            hashbrown::hash_table::Entry::Occupied(o) => {
                let k = *o.get();
                let entry = self
                    .slots
                    .get_mut(k)
                    .expect("index entries point at live slots");
                let old = core::mem::replace(&mut entry.value, value);
                (Handle(k), Some(old))
            }
            hashbrown::hash_table::Entry::Vacant(v) => {
                let seq = self.next_seq;
                self.next_seq += 1;
                let k = self.slots.insert(Entry {
                    key,
                    value,
                    hash,
                    seq,
                });
                v.insert(k);
                self.order.insert(seq, k);
                (Handle(k), None)
            }
        }
    }

    pub fn remove(&mut self, handle: Handle) -> Option<(K, V)> {
        let k = handle.0;
        let entry = self.slots.remove(k)?;
        if let Ok(occupied) = self.index.find_entry(entry.hash, |&kk| kk == k) {
            occupied.remove();
        }
        self.order.remove(&entry.seq);
        Some((entry.key, entry.value))
    }

    pub fn get(&self, handle: Handle) -> Option<&V> {
        self.slots.get(handle.0).map(|e| &e.value)
    }

    pub fn key(&self, handle: Handle) -> Option<&K> {
        self.slots.get(handle.0).map(|e| &e.key)
    }

    pub fn seq(&self, handle: Handle) -> Option<u64> {
        self.slots.get(handle.0).map(|e| e.seq)
    }

    /// First entry whose insertion sequence is `>= from`, in order.
    pub fn first_from(&self, from: u64) -> Option<Handle> {
        self.order.range(from..).next().map(|(_, &k)| Handle(k))
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &K, &V)> + '_ {
        self.order
            .values()
            .filter_map(move |&k| self.slots.get(k).map(|e| (Handle(k), &e.key, &e.value)))
    }
}
