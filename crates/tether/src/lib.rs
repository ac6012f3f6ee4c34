#![forbid(unsafe_code)]

//! Tether public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.

pub mod prelude {
    pub use tether_bind as bind;
    pub use tether_core as core;
    pub use tether_inject as inject;
    pub use tether_list as list;
    pub use tether_router as router;

    pub use tether_bind::{BindingConfig, BindingError, BindingTable, Component};
    pub use tether_core::{PropertyType, Selector, TypeGuards, Value, Widget};
    pub use tether_inject::{InjectableConfig, InjectionManager, Injector};
    pub use tether_list::{List, ListObserver, ListSource};
    pub use tether_router::{RouteConfig, Router};
}
