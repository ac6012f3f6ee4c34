//! Named-event hub with RAII subscriptions.
//!
//! Listeners are stored as `Weak` callbacks and pruned lazily during
//! notification; the returned [`Subscription`] guard owns the only strong
//! reference, so dropping it deactivates the callback before the next
//! trigger. Property change notifications follow the `<property>Changed`
//! naming convention (see [`changed_event`]).
//!
//! # Invariants
//!
//! 1. Callbacks fire synchronously, in registration order.
//! 2. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 3. Triggering an event with no listeners is a no-op.
//! 4. A callback registered during a trigger does not fire for that trigger.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ahash::AHashMap;

use crate::value::Value;

type Callback = Rc<dyn Fn(&Value)>;

/// RAII guard holding a listener alive. Drop it to unsubscribe.
pub struct Subscription {
    _cb: Rc<dyn Fn(&Value)>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Subscription")
    }
}

/// Shared hub of named-event listeners.
#[derive(Clone, Default)]
pub struct Listeners {
    inner: Rc<RefCell<AHashMap<String, Vec<Weak<dyn Fn(&Value)>>>>>,
}

impl Listeners {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for `event`. The callback stays active for the
    /// lifetime of the returned [`Subscription`].
    pub fn on(&self, event: impl Into<String>, callback: impl Fn(&Value) + 'static) -> Subscription {
        let cb: Callback = Rc::new(callback);
        self.inner
            .borrow_mut()
            .entry(event.into())
            .or_default()
            .push(Rc::downgrade(&cb));
        Subscription { _cb: cb }
    }

    /// Notify all live listeners of `event`, synchronously, in registration
    /// order. Dead entries are pruned while the list is borrowed, before the
    /// callbacks run, so a callback may re-enter the hub.
    pub fn trigger(&self, event: &str, value: &Value) {
        let callbacks: Vec<Callback> = {
            let mut map = self.inner.borrow_mut();
            let Some(list) = map.get_mut(event) else {
                return;
            };
            list.retain(|weak| weak.strong_count() > 0);
            list.iter().filter_map(Weak::upgrade).collect()
        };
        for cb in callbacks {
            cb(value);
        }
    }

    /// Number of live listeners for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.inner
            .borrow()
            .get(event)
            .map_or(0, |list| list.iter().filter(|w| w.strong_count() > 0).count())
    }

    /// Drop every registered listener entry.
    pub fn clear(&self) {
        self.inner.borrow_mut().clear();
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("events", &self.inner.borrow().len())
            .finish()
    }
}

/// The change-event name for a property, per the host convention:
/// `"text"` → `"textChanged"`.
#[must_use]
pub fn changed_event(property: &str) -> String {
    format!("{property}Changed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn listener_receives_trigger() {
        let hub = Listeners::new();
        let seen = Rc::new(Cell::new(0i64));
        let s = Rc::clone(&seen);
        let _sub = hub.on("ping", move |v| s.set(v.as_int().unwrap_or(-1)));

        hub.trigger("ping", &Value::from(7i64));
        assert_eq!(seen.get(), 7);
    }

    #[test]
    fn drop_unsubscribes() {
        let hub = Listeners::new();
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let sub = hub.on("ping", move |_| s.set(s.get() + 1));

        hub.trigger("ping", &Value::Null);
        drop(sub);
        hub.trigger("ping", &Value::Null);
        assert_eq!(seen.get(), 1, "callback must not fire after drop");
    }

    #[test]
    fn listeners_fire_in_registration_order() {
        let hub = Listeners::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let (a, b) = (Rc::clone(&order), Rc::clone(&order));
        let _s1 = hub.on("e", move |_| a.borrow_mut().push(1));
        let _s2 = hub.on("e", move |_| b.borrow_mut().push(2));

        hub.trigger("e", &Value::Null);
        assert_eq!(*order.borrow(), vec![1, 2]);
    }

    #[test]
    fn unknown_event_is_noop() {
        let hub = Listeners::new();
        hub.trigger("nothing", &Value::Null);
    }

    #[test]
    fn listener_count_tracks_live_subscriptions() {
        let hub = Listeners::new();
        let s1 = hub.on("e", |_| {});
        let _s2 = hub.on("e", |_| {});
        assert_eq!(hub.listener_count("e"), 2);
        drop(s1);
        assert_eq!(hub.listener_count("e"), 1);
    }

    #[test]
    fn reentrant_trigger_does_not_panic() {
        let hub = Listeners::new();
        let hub2 = hub.clone();
        let _sub = hub.on("outer", move |_| hub2.trigger("inner", &Value::Null));
        hub.trigger("outer", &Value::Null);
    }

    #[test]
    fn changed_event_convention() {
        assert_eq!(changed_event("selection"), "selectionChanged");
    }
}
