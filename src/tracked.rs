//! Value wrapper and destruction sentinels.
//!
//! Rust's object model does not allow attaching incidental state to an
//! arbitrary value, so stored values travel in an explicit wrapper instead:
//! `Rc<Tracked<T>>`. The wrapper carries one [`Sentinel`] per (array, key)
//! occupancy while destruction detection is enabled. Because the sentinels
//! are reachable only through the value, they are dropped exactly when the
//! value is, and each active sentinel turns that moment into a `Destructed`
//! event on its owning array.
//!
//! Destruct path discipline: a sentinel drop upgrades its weak owner
//! reference and fires one event. It never touches the owner's slot table,
//! so it is safe to run from any point where a value can die, including
//! application code far away from any array call.

use crate::key::Key;
use crate::weak_array::ArrayCore;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::ops::Deref;
use std::rc::{Rc, Weak};

/// Wrapper every stored value travels in.
///
/// Derefs to `T`. Values are shared: clone the `Rc` to keep the value alive,
/// drop the last clone to let arrays observe its reclamation.
pub struct Tracked<T> {
    value: T,
    sentinels: RefCell<Vec<Sentinel<T>>>,
}

impl<T> Tracked<T> {
    pub fn new(value: T) -> Rc<Self> {
        Rc::new(Self {
            value,
            sentinels: RefCell::new(Vec::new()),
        })
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub(crate) fn attach_sentinel(&self, owner: Weak<ArrayCore<T>>, key: Key) {
        self.sentinels.borrow_mut().push(Sentinel {
            owner,
            key,
            active: Cell::new(true),
        });
    }

    /// Deactivates and discards the sentinel for one (array, key) occupancy.
    /// Idempotent: retiring an occupancy that carries no sentinel is a no-op.
    pub(crate) fn retire_sentinel(&self, owner: &Weak<ArrayCore<T>>, key: &Key) {
        let mut sentinels = self.sentinels.borrow_mut();
        for sentinel in sentinels.iter() {
            if sentinel.key == *key && Weak::ptr_eq(&sentinel.owner, owner) {
                sentinel.active.set(false);
            }
        }
        // Dropping a deactivated sentinel is silent.
        sentinels.retain(|s| s.active.get());
    }
}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tracked").field(&self.value).finish()
    }
}

/// Disposable marker for one (array, key) occupancy. Fires at most once:
/// either its value is reclaimed while it is still active, or the owning
/// array deactivates it first on explicit unset/overwrite.
struct Sentinel<T> {
    owner: Weak<ArrayCore<T>>,
    key: Key,
    active: Cell<bool>,
}

impl<T> Drop for Sentinel<T> {
    fn drop(&mut self) {
        if !self.active.get() {
            return;
        }
        // The owner is held weakly so a sentinel never keeps an array alive;
        // if the array is already gone there is nobody left to notify.
        if let Some(owner) = self.owner.upgrade() {
            ArrayCore::emit_destructed(&owner, self.key.clone());
        }
    }
}
