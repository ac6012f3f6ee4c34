#![forbid(unsafe_code)]

//! Dependency injection for Tether.
//!
//! [`Injector`] is the low-level registry: one handler per exact type, with
//! duplicate and use-once-removal guards. [`InjectionManager`] layers
//! multi-candidate registration on top: priority ordering, shared
//! (memoized) instances, string-parameter dispatch, and base-type
//! (`implements`) keys. [`Constructor`] plus [`Injector::create`] cover
//! constructor-parameter injection mixed with positional arguments.
//!
//! Both registries are plain objects owned by the composition root, not
//! process globals.

pub mod injector;
pub mod manager;

pub use injector::{Constructor, InjectError, Injection, Injector, Param, Slots, TypeKey};
pub use manager::{InjectableConfig, InjectionManager};
