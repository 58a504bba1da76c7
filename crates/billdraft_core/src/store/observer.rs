//! Observer list with RAII subscriptions.
//!
//! Callbacks are held weakly by the list and strongly by the returned
//! [`Subscription`]; dropping the subscription unsubscribes. Dead entries are
//! pruned lazily on the next notification.

use std::any::Any;
use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::rc::{Rc, Weak};

type Callback<E> = dyn Fn(&E);

/// Registration-ordered callback list for events of type `E`.
pub struct Subscribers<E> {
    slots: RefCell<Vec<Weak<Callback<E>>>>,
}

impl<E: 'static> Subscribers<E> {
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(Vec::new()),
        }
    }

    /// Registers `callback`; it stays active while the returned guard lives.
    pub fn subscribe(&self, callback: impl Fn(&E) + 'static) -> Subscription {
        let strong: Rc<Callback<E>> = Rc::new(callback);
        self.slots.borrow_mut().push(Rc::downgrade(&strong));
        Subscription {
            _callback: Box::new(strong),
        }
    }

    /// Invokes every live callback in registration order.
    ///
    /// The live set is captured before the first call, so callbacks may
    /// subscribe, unsubscribe or trigger nested notifications safely.
    /// Returns the number of callbacks invoked.
    pub fn notify(&self, event: &E) -> usize {
        let live: Vec<Rc<Callback<E>>> = {
            let mut slots = self.slots.borrow_mut();
            slots.retain(|slot| slot.strong_count() > 0);
            slots.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in &live {
            callback(event);
        }
        live.len()
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.slots
            .borrow()
            .iter()
            .filter(|slot| slot.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: 'static> Default for Subscribers<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps a callback registered; drop to unsubscribe.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    _callback: Box<dyn Any>,
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::Subscribers;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn notifies_in_registration_order() {
        let subscribers = Subscribers::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first_seen = Rc::clone(&seen);
        let _first = subscribers.subscribe(move |value| first_seen.borrow_mut().push(("a", *value)));
        let second_seen = Rc::clone(&seen);
        let _second =
            subscribers.subscribe(move |value| second_seen.borrow_mut().push(("b", *value)));

        assert_eq!(subscribers.notify(&7), 2);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let subscribers = Subscribers::<u32>::new();
        let count = Rc::new(RefCell::new(0));

        let counter = Rc::clone(&count);
        let subscription = subscribers.subscribe(move |_| *counter.borrow_mut() += 1);
        subscribers.notify(&1);
        drop(subscription);
        subscribers.notify(&2);

        assert_eq!(*count.borrow(), 1);
        assert!(subscribers.is_empty());
    }

    #[test]
    fn callbacks_may_subscribe_during_notification() {
        let subscribers = Rc::new(Subscribers::<u32>::new());
        let late = Rc::new(RefCell::new(Vec::new()));

        let inner = Rc::clone(&subscribers);
        let late_guards = Rc::clone(&late);
        let _outer = subscribers.subscribe(move |_| {
            late_guards.borrow_mut().push(inner.subscribe(|_| {}));
        });

        assert_eq!(subscribers.notify(&1), 1);
        assert_eq!(subscribers.len(), 2);
    }
}
