//! The weak array: an insertion-ordered, keyed map of weak references.

use crate::error::ConfigError;
use crate::event::{Event, EventKind};
use crate::key::Key;
use crate::observer::{Observer, ObserverSet};
use crate::ordered_map::OrderedHashMap;
use crate::slot::WeakSlot;
use crate::tracked::Tracked;
use core::cell::{Cell, RefCell};
use core::fmt;
use std::rc::Rc;

/// Default number of interactions between amortized garbage collections.
pub const GC_PERIOD_DEFAULT: u32 = 1024;

/// Most aggressive garbage collection period: prune on every interaction.
pub const GC_PERIOD_INTENSIVE: u32 = 1;

/// Shared state behind every `WeakArray` handle.
///
/// Kept behind an `Rc` so that events can carry a subject handle and
/// sentinels can point back at their owner without keeping it alive.
/// Interior mutability is single-threaded (`RefCell`/`Cell`); the `RefCell`
/// borrow rules double as a dynamic guard against structural re-entry while
/// the slot table is transiently inconsistent.
pub(crate) struct ArrayCore<T> {
    map: RefCell<OrderedHashMap<Key, WeakSlot<T>>>,
    observers: RefCell<ObserverSet<T>>,
    detect_destructions: bool,
    gc_period: Cell<u32>,
    gc_ticks: Cell<u32>,
    /// Watermark for auto-increment keys: the next key `push` would issue.
    /// Never decreases, so auto-issued keys are never reused, independent
    /// of removals.
    next_auto_key: Cell<i64>,
}

impl<T> ArrayCore<T> {
    /// Amortized prune: every `gc_period` interactions, or immediately when
    /// forced. Pruning drops only weak references and keys, never user code,
    /// so it is safe to run while the map is mutably borrowed.
    fn gc(&self, force: bool) {
        let due = force || {
            let ticks = self.gc_ticks.get() + 1;
            if ticks >= self.gc_period.get() {
                true
            } else {
                self.gc_ticks.set(ticks);
                false
            }
        };
        if !due {
            return;
        }
        self.gc_ticks.set(0);
        let mut map = self.map.borrow_mut();
        let stale: Vec<_> = map
            .iter()
            .filter(|(_, _, slot)| !slot.is_alive())
            .map(|(handle, _, _)| handle)
            .collect();
        for handle in stale {
            let _ = map.remove(handle);
        }
    }

    /// Fans `event` out to a snapshot of the attached observers, in
    /// attachment order, synchronously. No borrows are held across the
    /// callbacks, so observers may re-enter the array freely.
    fn fan_out(&self, event: &Event<T>) {
        let snapshot = self.observers.borrow().snapshot();
        for observer in snapshot {
            observer.update(event);
        }
    }

    fn emit(core: &Rc<Self>, kind: EventKind, key: Option<Key>) {
        let subject = WeakArray {
            core: Rc::clone(core),
        };
        let event = Event::new(subject, kind, key);
        core.fan_out(&event);
    }

    /// Destruct path: called from a sentinel drop when a value is reclaimed
    /// while still occupying a key. Only fires an event; the stale slot is
    /// left for compaction.
    pub(crate) fn emit_destructed(core: &Rc<Self>, key: Key) {
        Self::emit(core, EventKind::Destructed, Some(key));
    }
}

/// An insertion-ordered map from [`Key`] to a weakly held `Rc<Tracked<T>>`.
///
/// The array never extends a value's lifetime: once the last strong
/// reference outside the array is dropped, the entry reads as absent and is
/// physically pruned by the next (amortized or forced) garbage collection.
///
/// `WeakArray` is a handle: cloning it yields another handle to the same
/// underlying array, which is what [`Event::subject`] carries.
///
/// Single-threaded by construction (`Rc`/`RefCell`); share across threads
/// only behind an external lock, which the types will force you to notice.
pub struct WeakArray<T> {
    pub(crate) core: Rc<ArrayCore<T>>,
}

impl<T> Clone for WeakArray<T> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<T> Default for WeakArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WeakArray<T> {
    /// Empty array: destruction detection off, default GC period.
    pub fn new() -> Self {
        match Self::with_options(false, GC_PERIOD_DEFAULT) {
            Ok(array) => array,
            Err(_) => unreachable!("default period is valid"),
        }
    }

    /// Empty array with explicit options.
    ///
    /// With `detect_destructions` on, every subsequently stored value gets a
    /// sentinel and observers receive a [`EventKind::Destructed`] event when
    /// the value is reclaimed while still occupying its key. `gc_period` is
    /// the number of interactions between amortized prunes; it must be at
    /// least 1.
    pub fn with_options(detect_destructions: bool, gc_period: u32) -> Result<Self, ConfigError> {
        if gc_period < 1 {
            return Err(ConfigError::ZeroGcPeriod);
        }
        Ok(Self {
            core: Rc::new(ArrayCore {
                map: RefCell::new(OrderedHashMap::new()),
                observers: RefCell::new(ObserverSet::new()),
                detect_destructions,
                gc_period: Cell::new(gc_period),
                gc_ticks: Cell::new(0),
                next_auto_key: Cell::new(0),
            }),
        })
    }

    /// Whether stored values get reclamation sentinels.
    pub fn detects_destructions(&self) -> bool {
        self.core.detect_destructions
    }

    pub fn gc_period(&self) -> u32 {
        self.core.gc_period.get()
    }

    pub fn set_gc_period(&self, gc_period: u32) -> Result<(), ConfigError> {
        if gc_period < 1 {
            return Err(ConfigError::ZeroGcPeriod);
        }
        self.core.gc_period.set(gc_period);
        Ok(())
    }

    /// `true` iff both handles refer to the same underlying array.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.core, &b.core)
    }

    /// Binds `key` to `value` and returns the key. Emits `Set(key)`.
    ///
    /// If the key was already bound, the previous occupancy is retired first
    /// (its sentinel deactivated, its slot replaced in place so the key
    /// keeps its iteration position); no separate `Unset` event is emitted,
    /// since it is superseded by the `Set`.
    pub fn set(&self, key: impl Into<Key>, value: &Rc<Tracked<T>>) -> Key {
        let key = key.into();
        self.install(key.clone(), value);
        key
    }

    /// Appends `value` under the next auto-increment integer key and
    /// returns that key. Emits `Set(key)`.
    pub fn push(&self, value: &Rc<Tracked<T>>) -> Key {
        let key = Key::Int(self.core.next_auto_key.get());
        self.install(key.clone(), value);
        key
    }

    fn install(&self, key: Key, value: &Rc<Tracked<T>>) {
        let core = &self.core;

        // Explicit integer keys raise the auto-key watermark so a later
        // `push` can never collide with a key the caller chose.
        if let Key::Int(i) = key {
            if i >= core.next_auto_key.get() {
                core.next_auto_key.set(i.saturating_add(1));
            }
        }

        // Retire the previous occupancy for this key so its sentinel cannot
        // fire for a binding the application replaced deliberately.
        let previous = {
            let map = core.map.borrow();
            map.find(&key)
                .and_then(|handle| map.get(handle))
                .and_then(WeakSlot::get)
        };
        if let Some(previous) = previous {
            previous.retire_sentinel(&Rc::downgrade(core), &key);
        }

        let _ = core.map.borrow_mut().insert(key.clone(), WeakSlot::new(value));

        if core.detect_destructions {
            value.attach_sentinel(Rc::downgrade(core), key.clone());
        }

        core.gc(false);
        ArrayCore::emit(core, EventKind::Set, Some(key));
    }

    /// The live value under `key`, or `None` if the key is unbound or its
    /// value has been reclaimed. Read-only: no event.
    pub fn get(&self, key: impl Into<Key>) -> Option<Rc<Tracked<T>>> {
        let key = key.into();
        self.core.gc(false);
        let map = self.core.map.borrow();
        map.find(&key)
            .and_then(|handle| map.get(handle))
            .and_then(WeakSlot::get)
    }

    /// Liveness check for `key`. Read-only: no event.
    pub fn contains(&self, key: impl Into<Key>) -> bool {
        let key = key.into();
        self.core.gc(false);
        let map = self.core.map.borrow();
        map.find(&key)
            .and_then(|handle| map.get(handle))
            .map_or(false, WeakSlot::is_alive)
    }

    /// Removes the binding for `key`. Returns `true` and emits `Unset(key)`
    /// iff a live entry was removed; an absent key is a no-op and a stale
    /// slot is pruned silently (the value was already reclaimed, so there is
    /// nothing left to un-set).
    pub fn unset(&self, key: impl Into<Key>) -> bool {
        let key = key.into();
        let core = &self.core;

        let found = {
            let map = core.map.borrow();
            map.find(&key)
                .map(|handle| (handle, map.get(handle).and_then(WeakSlot::get)))
        };
        let Some((handle, value)) = found else {
            core.gc(false);
            return false;
        };

        match value {
            Some(value) => {
                value.retire_sentinel(&Rc::downgrade(core), &key);
                let _ = core.map.borrow_mut().remove(handle);
                drop(value);
                core.gc(false);
                ArrayCore::emit(core, EventKind::Unset, Some(key));
                true
            }
            None => {
                let _ = core.map.borrow_mut().remove(handle);
                core.gc(false);
                false
            }
        }
    }

    /// Keys of all live entries, in insertion order. Forces a full prune
    /// first so the result reflects true current liveness.
    pub fn keys(&self) -> Vec<Key> {
        self.core.gc(true);
        let map = self.core.map.borrow();
        map.iter().map(|(_, key, _)| key.clone()).collect()
    }

    /// Number of live entries. Forces a full prune first, so this never
    /// overcounts entries whose values died since the last collection.
    pub fn len(&self) -> usize {
        self.core.gc(true);
        self.core.map.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lazy iteration over live `(key, value)` pairs in insertion order.
    ///
    /// The iterator holds no borrow between steps, so the array may be
    /// mutated freely from the loop body; each step reflects the live view
    /// at that moment. Stale entries encountered along the way are pruned in
    /// place. A fresh call restarts from the beginning.
    pub fn iter(&self) -> Iter<'_, T> {
        self.core.gc(false);
        Iter {
            array: self,
            cursor: 0,
        }
    }

    /// Attaches `observer` unless that same instance is already attached.
    pub fn attach(&self, observer: Rc<dyn Observer<T>>) {
        self.core.observers.borrow_mut().attach(observer);
    }

    /// Detaches every occurrence of `observer`. Unattached instances are
    /// ignored.
    pub fn detach(&self, observer: &Rc<dyn Observer<T>>) {
        self.core.observers.borrow_mut().detach(observer);
    }

    /// Notifies all attached observers with a synthesized keyless
    /// [`EventKind::Notify`] event.
    pub fn notify(&self) {
        ArrayCore::emit(&self.core, EventKind::Notify, None);
    }

    /// Fans a caller-supplied event out to this array's observers. Lets
    /// arrays be composed: an observer of one array can forward events into
    /// another subject.
    pub fn notify_event(&self, event: &Event<T>) {
        self.core.fan_out(event);
    }
}

impl<T> fmt::Debug for WeakArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Raw slot count, deliberately without forcing a collection.
        f.debug_struct("WeakArray")
            .field("slots", &self.core.map.borrow().len())
            .field("detect_destructions", &self.core.detect_destructions)
            .field("gc_period", &self.core.gc_period.get())
            .finish()
    }
}

impl<T> Extend<(Key, Rc<Tracked<T>>)> for WeakArray<T> {
    fn extend<I: IntoIterator<Item = (Key, Rc<Tracked<T>>)>>(&mut self, entries: I) {
        for (key, value) in entries {
            self.set(key, &value);
        }
    }
}

impl<T> FromIterator<(Key, Rc<Tracked<T>>)> for WeakArray<T> {
    /// Builds an array from an initial mapping. The array holds the values
    /// weakly; the caller must keep the `Rc`s alive for the entries to
    /// remain live.
    fn from_iter<I: IntoIterator<Item = (Key, Rc<Tracked<T>>)>>(entries: I) -> Self {
        let array = Self::new();
        for (key, value) in entries {
            array.set(key, &value);
        }
        array
    }
}

/// Iterator returned by [`WeakArray::iter`].
///
/// The cursor is an insertion-sequence watermark, not a position, so
/// insertions and removals between steps (by the loop body or by values
/// dying) never confuse the walk.
pub struct Iter<'a, T> {
    array: &'a WeakArray<T>,
    cursor: u64,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Key, Rc<Tracked<T>>);

    fn next(&mut self) -> Option<Self::Item> {
        let core = &self.array.core;
        // Explicit loop: a long run of dead entries must not recurse.
        loop {
            let (handle, key, value) = {
                let map = core.map.borrow();
                let handle = map.first_from(self.cursor)?;
                let seq = map.seq(handle).expect("ordered entries resolve");
                let key = map.key(handle).expect("ordered entries resolve").clone();
                self.cursor = seq + 1;
                (handle, key, map.get(handle).and_then(WeakSlot::get))
            };
            match value {
                Some(value) => return Some((key, value)),
                None => {
                    // Stale: prune in place and keep walking.
                    let mut map = core.map.borrow_mut();
                    if map.get(handle).map_or(false, |slot| !slot.is_alive()) {
                        let _ = map.remove(handle);
                    }
                }
            }
        }
    }
}

impl<'a, T> IntoIterator for &'a WeakArray<T> {
    type Item = (Key, Rc<Tracked<T>>);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
