//! Observer protocol: the receiving trait and the ordered registry.

use crate::event::Event;
use std::rc::Rc;

/// Receiver side of the notification protocol. Any type with a single
/// `update` callback can be attached to a [`WeakArray`](crate::WeakArray).
///
/// `update` runs synchronously on the caller's stack, in attachment order.
/// Observers may re-enter the subject array (query it, mutate it, detach
/// themselves); membership changes made during a fan-out take effect from
/// the next event.
pub trait Observer<T> {
    fn update(&self, event: &Event<T>);
}

/// Ordered observer registry with identity-based, idempotent membership.
pub(crate) struct ObserverSet<T> {
    observers: Vec<Rc<dyn Observer<T>>>,
}

impl<T> ObserverSet<T> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Appends `observer` unless the same instance is already attached.
    pub fn attach(&mut self, observer: Rc<dyn Observer<T>>) {
        if !self.observers.iter().any(|o| Rc::ptr_eq(o, &observer)) {
            self.observers.push(observer);
        }
    }

    /// Removes every occurrence of `observer`.
    pub fn detach(&mut self, observer: &Rc<dyn Observer<T>>) {
        self.observers.retain(|o| !Rc::ptr_eq(o, observer));
    }

    /// The current membership, in attachment order. Fan-out iterates over
    /// this snapshot so observers can attach/detach mid-notification.
    pub fn snapshot(&self) -> Vec<Rc<dyn Observer<T>>> {
        self.observers.clone()
    }
}
