//! A single weakly held occupancy.

use crate::tracked::Tracked;
use std::rc::{Rc, Weak};

/// Thin adapter over `std::rc::Weak`: holds a reference that never extends
/// the referent's lifetime. A slot is *live* while some strong reference to
/// the value still exists, *stale* afterwards.
pub(crate) struct WeakSlot<T> {
    referent: Weak<Tracked<T>>,
}

impl<T> WeakSlot<T> {
    pub fn new(value: &Rc<Tracked<T>>) -> Self {
        Self {
            referent: Rc::downgrade(value),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.referent.strong_count() > 0
    }

    pub fn get(&self) -> Option<Rc<Tracked<T>>> {
        self.referent.upgrade()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_goes_stale_with_last_strong_ref() {
        let value = Tracked::new(42);
        let slot = WeakSlot::new(&value);
        assert!(slot.is_alive());
        assert!(Rc::ptr_eq(&slot.get().unwrap(), &value));

        drop(value);
        assert!(!slot.is_alive());
        assert!(slot.get().is_none());
    }
}
