#![forbid(unsafe_code)]

//! Host contract surface for Tether.
//!
//! The binding engine, injector, and router operate against a small widget
//! host model: dynamically typed property values, a nominal type registry
//! with runtime guards, a named-event hub with `<property>Changed`
//! conventions, and a composite widget tree with selector search, append, and
//! dispose. A production host supplies its own widgets; this crate provides
//! the contract plus a conforming in-process implementation used by the
//! engine and its tests.

pub mod error;
pub mod events;
pub mod selector;
pub mod types;
pub mod value;
pub mod widget;

pub use error::CoreError;
pub use events::{Listeners, Subscription, changed_event};
pub use selector::Selector;
pub use types::{PropertyType, TypeGuards};
pub use value::{ObjectValue, Value};
pub use widget::{EVENT_ATTACH, EVENT_CHILD_REMOVED, Widget};
