#![forbid(unsafe_code)]

//! Shared state cell with change notification.
//!
//! [`Observable<T>`] is the default [`StateCell`] behind a container query:
//! one `Rc<RefCell<..>>` shared by every handle, a version counter bumped on
//! each real change, and subscribers held as `Weak` callbacks so a dropped
//! [`Subscription`] silently stops receiving updates.
//!
//! # Invariants
//!
//! | # | Invariant |
//! |---|-----------|
//! | 1 | `version` grows by exactly 1 per value-changing write. |
//! | 2 | Writing a value equal to the current one is a no-op. |
//! | 3 | Subscribers run in registration order, after the borrow is released. |
//!
//! # Failure Modes
//!
//! | Situation | Behavior |
//! |-----------|----------|
//! | Subscriber writes back into the same cell | Allowed; the nested write notifies before the outer loop continues. |
//! | Guard kept forever | Callback stays live; dead entries are pruned on the next notify. |

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;
type WeakCallback<T> = Weak<dyn Fn(&T)>;

/// Host-provided reactive state.
///
/// A coordinator only needs to read, replace and patch its state, and to let
/// the host re-render when it changes. Anything that can do that (a UI
/// framework's signal, a test double) can stand in for [`Observable`].
pub trait StateCell<T> {
    /// Snapshot of the current value.
    fn get(&self) -> T;

    /// Replace the value; subscribers run only if it changed.
    fn set(&self, value: T);

    /// Patch the value in place; subscribers run only if it changed.
    fn update(&self, f: &mut dyn FnMut(&mut T));

    /// Register a change callback. Dropping the guard unsubscribes it.
    fn subscribe(&self, callback: Box<dyn Fn(&T)>) -> Subscription;
}

struct Slot<T> {
    value: T,
    version: u64,
    subscribers: Vec<WeakCallback<T>>,
}

/// Shared, versioned value. Clones are handles to the same slot.
pub struct Observable<T> {
    slot: Rc<RefCell<Slot<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.borrow();
        f.debug_struct("Observable")
            .field("value", &slot.value)
            .field("version", &slot.version)
            .field("subscribers", &slot.subscribers.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Borrow the value for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.slot.borrow().value)
    }

    /// Number of value-changing writes so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.slot.borrow().version
    }

    /// Registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.slot.borrow().subscribers.len()
    }

    /// Whether both handles share one slot.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }

    fn write(&self, f: impl FnOnce(&mut T)) {
        let changed = {
            let mut slot = self.slot.borrow_mut();
            let before = slot.value.clone();
            f(&mut slot.value);
            let changed = slot.value != before;
            if changed {
                slot.version += 1;
            }
            changed
        };
        if changed {
            self.notify();
        }
    }

    fn notify(&self) {
        let (callbacks, value) = {
            let mut slot = self.slot.borrow_mut();
            slot.subscribers.retain(|w| w.strong_count() > 0);
            let live: Vec<Callback<T>> =
                slot.subscribers.iter().filter_map(Weak::upgrade).collect();
            (live, slot.value.clone())
        };
        for callback in &callbacks {
            callback(&value);
        }
    }
}

impl<T: Clone + PartialEq + 'static> StateCell<T> for Observable<T> {
    fn get(&self) -> T {
        self.slot.borrow().value.clone()
    }

    fn set(&self, value: T) {
        if self.slot.borrow().value == value {
            return;
        }
        self.write(|slot| *slot = value);
    }

    fn update(&self, f: &mut dyn FnMut(&mut T)) {
        self.write(|value| f(value));
    }

    fn subscribe(&self, callback: Box<dyn Fn(&T)>) -> Subscription {
        let strong: Callback<T> = Rc::from(callback);
        self.slot
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }
}

/// Keeps a subscriber callback alive. Drop it to unsubscribe.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter(cell: &Observable<u32>) -> (Rc<Cell<u32>>, Subscription) {
        let hits = Rc::new(Cell::new(0));
        let seen = Rc::clone(&hits);
        let sub = cell.subscribe(Box::new(move |_| seen.set(seen.get() + 1)));
        (hits, sub)
    }

    #[test]
    fn set_bumps_version_only_on_change() {
        let cell = Observable::new(1u32);
        cell.set(1);
        assert_eq!(cell.version(), 0);
        cell.set(2);
        assert_eq!(cell.get(), 2);
        assert_eq!(cell.version(), 1);
    }

    #[test]
    fn update_notifies_on_change_only() {
        let cell = Observable::new(5u32);
        let (hits, _sub) = counter(&cell);
        cell.update(&mut |v| *v += 0);
        assert_eq!(hits.get(), 0);
        cell.update(&mut |v| *v += 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(cell.with(|v| *v), 6);
    }

    #[test]
    fn dropped_subscription_stops_callbacks() {
        let cell = Observable::new(0u32);
        let (hits, sub) = counter(&cell);
        cell.set(1);
        drop(sub);
        cell.set(2);
        assert_eq!(hits.get(), 1);
        assert_eq!(cell.subscriber_count(), 0);
    }

    #[test]
    fn subscribers_run_in_registration_order() {
        let cell = Observable::new(0u32);
        let order = Rc::new(RefCell::new(Vec::new()));
        let a = Rc::clone(&order);
        let b = Rc::clone(&order);
        let _sa = cell.subscribe(Box::new(move |_| a.borrow_mut().push('a')));
        let _sb = cell.subscribe(Box::new(move |_| b.borrow_mut().push('b')));
        cell.set(9);
        assert_eq!(*order.borrow(), vec!['a', 'b']);
    }

    #[test]
    fn subscriber_may_write_back() {
        let cell = Observable::new(0u32);
        let handle = cell.clone();
        let _sub = cell.subscribe(Box::new(move |v| {
            if *v == 1 {
                handle.set(2);
            }
        }));
        cell.set(1);
        assert_eq!(cell.get(), 2);
        assert_eq!(cell.version(), 2);
    }

    #[test]
    fn clones_share_state() {
        let a = Observable::new(String::from("x"));
        let b = a.clone();
        b.set("y".into());
        assert_eq!(a.get(), "y");
        assert!(a.ptr_eq(&b));
    }
}
