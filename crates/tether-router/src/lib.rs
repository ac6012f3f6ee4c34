#![forbid(unsafe_code)]

//! Navigation components for Tether.
//!
//! [`RouterMatcher`] turns a route list into a duplicate-checked name
//! lookup; [`Router`] owns a navigation widget plus an observable history
//! list and keeps the two structurally synchronized in both directions:
//! history mutations drive page creation and disposal, host-initiated child
//! removal shrinks the history.

pub mod matcher;
pub mod router;

pub use matcher::{RouteConfig, RouteError, RouterMatcher};
pub use router::{HistoryItem, Router};
