//! External state sources a binding can observe.

use tether_core::{Subscription, Value};

/// A read-only state store bindings can subscribe to.
///
/// The binding engine only consumes this interface; wiring a concrete store
/// into component properties is left to the host application.
pub trait StateProvider {
    /// Current state snapshot.
    fn get_state(&self) -> Value;

    /// Subscribe to state changes for the lifetime of the returned guard.
    fn subscribe(&self, callback: Box<dyn Fn(&Value)>) -> Subscription;
}
