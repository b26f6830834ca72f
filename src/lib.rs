//! weak-array: a single-threaded, insertion-ordered map of weak references
//! with amortized pruning of dead entries and an observer protocol for
//! set/unset/destruction events.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: hold values without keeping them alive, keep iteration coherent
//!   while entries can die at any moment, and tell observers when a value
//!   is actually reclaimed, in safe, verifiable layers.
//! - Layers:
//!   - OrderedHashMap<K, V>: structural map with stable generational
//!     handles (`slotmap`), a `hashbrown::HashTable` index over stored
//!     per-entry hashes, and a monotonic insertion-sequence index that
//!     gives cursors a stable meaning across arbitrary mutation.
//!   - WeakSlot<T>: one weakly held occupancy over `std::rc::Weak`.
//!   - Tracked<T>: the wrapper stored values travel in; carries the
//!     sentinels that turn a value's reclamation into a `Destructed` event.
//!   - WeakArray<T>: public API orchestrating slots, sentinels, amortized
//!     garbage collection, and event fan-out.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` by construction (`Rc`, `RefCell`,
//!   `Cell`); callers sharing an array across threads need an external lock
//!   and the types will force them to notice.
//! - The array never extends a value's lifetime; values are shared
//!   `Rc<Tracked<T>>` owned by the application.
//! - Dead entries are pruned lazily: every interaction ticks a counter and
//!   a full prune runs once per configurable period; `keys()`/`len()`
//!   force one so their answers reflect true liveness.
//! - Auto-increment keys are monotonic and never reissued.
//!
//! Destruct path discipline
//! - A sentinel drop (the moment a value is reclaimed) upgrades a weak
//!   reference to its owning array and fires exactly one event. It never
//!   touches the slot table, so it is safe wherever a value can die,
//!   including in application code far from any array call. Observers run
//!   with no internal borrows held and may re-enter the array freely.
//!
//! Reclamation model
//! - Built on `Rc`, reclamation is deterministic: the last strong drop runs
//!   destructors immediately, so `Destructed` events arrive synchronously
//!   at that drop. The flip side is that reference cycles are never
//!   reclaimed and therefore never produce an event.
//!
//! Notes and non-goals
//! - Not a cache: the only eviction is liveness.
//! - Events are transient records fanned out synchronously in attachment
//!   order; nothing is queued or persisted.
//! - Public surface: `WeakArray`, `Tracked`, `Key`, `Event`/`EventKind`,
//!   `Observer`, `ConfigError`; the structural map and slot types are
//!   implementation details.

mod error;
mod event;
mod key;
mod observer;
mod ordered_map;
mod slot;
mod tracked;
mod weak_array;

// Public surface
pub use error::ConfigError;
pub use event::{Event, EventKind};
pub use key::Key;
pub use observer::Observer;
pub use tracked::Tracked;
pub use weak_array::{Iter, WeakArray, GC_PERIOD_DEFAULT, GC_PERIOD_INTENSIVE};
