#![forbid(unsafe_code)]

//! Observable list types for Tether.
//!
//! [`List<T>`] is an ordered, index-addressable container that reports every
//! structural change as a single [`Mutation`] (a contiguous replace-range).
//! [`ListObserver<T>`] adapts either a plain vector or a `List` into one
//! uniform mutation stream, synthesizing reconciliation mutations when the
//! source reference is swapped wholesale.
//!
//! The correctness law for both: replaying the emitted mutations as splices
//! against a mirror of the pre-operation state reproduces the post-operation
//! state exactly.

pub mod list;
pub mod observer;

pub use list::{DeleteCount, List, ListError, ListSubscription, Mutation, Slot};
pub use observer::{ListObserver, ListSource};
