#![forbid(unsafe_code)]

//! Reactive state for coordinators.
//!
//! - [`StateCell`]: the capability a host provides for state that triggers
//!   re-renders.
//! - [`Observable`]: the built-in single-threaded implementation.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.

pub mod observable;

pub use observable::{Observable, StateCell, Subscription};
