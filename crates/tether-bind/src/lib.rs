#![forbid(unsafe_code)]

//! Declarative property bindings for Tether.
//!
//! A [`BindingTable`] declares one-way (`base property → target property`)
//! and two-way (`base property ↔ selector.property`) bindings for one
//! component; paths are validated at declaration. A [`Component`] wraps the
//! base widget and services the table: bindings resolve synchronously during
//! the base's first attach, and two-way declarations turn the base property
//! into an accessor pair routed through [`Component::get`] and
//! [`Component::set`].
//!
//! Failures always carry the owning property and path; violations detected
//! inside event callbacks are recorded, logged, and surfaced on the next
//! accessor use.

pub mod component;
pub mod config;
pub mod converter;
pub mod error;
pub mod jsx;
pub mod path;
pub mod state;
pub mod table;

pub use component::{BindingState, Component};
pub use config::{BindingConfig, UnsafeBindingPolicy};
pub use converter::{Converter, ConverterContext};
pub use error::BindingError;
pub use jsx::apply_bind_attributes;
pub use path::PathOrigin;
pub use state::StateProvider;
pub use table::BindingTable;
