//! Immutable notification records.
//!
//! Events are constructed at the moment of the triggering action and
//! consumed synchronously by observers; nothing is queued or persisted.

use crate::key::Key;
use crate::tracked::Tracked;
use crate::weak_array::WeakArray;
use core::fmt;
use std::rc::Rc;

/// What happened to the subject array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `notify()` was called without an explicit event; carries no key.
    Notify,
    /// A key was bound to a value.
    Set,
    /// A key was explicitly removed.
    Unset,
    /// The value under a key was reclaimed. The value is no longer
    /// retrievable by the time observers see this.
    Destructed,
}

/// One notification: the subject array, what happened, and the key involved
/// (absent for [`EventKind::Notify`]).
pub struct Event<T> {
    subject: WeakArray<T>,
    kind: EventKind,
    key: Option<Key>,
}

impl<T> Event<T> {
    pub(crate) fn new(subject: WeakArray<T>, kind: EventKind, key: Option<Key>) -> Self {
        Self { subject, kind, key }
    }

    /// The array this event originated from. A handle, so observers can act
    /// on the subject (query it, attach to it) from inside `update`.
    pub fn subject(&self) -> &WeakArray<T> {
        &self.subject
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// The value the event refers to, if it is still retrievable.
    ///
    /// Always `None` for [`EventKind::Destructed`] events and keyless events.
    pub fn value(&self) -> Option<Rc<Tracked<T>>> {
        let key = self.key.clone()?;
        self.subject.get(key)
    }
}

impl<T> Clone for Event<T> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
            kind: self.kind,
            key: self.key.clone(),
        }
    }
}

impl<T> fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("kind", &self.kind)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
