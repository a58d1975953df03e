#![forbid(unsafe_code)]

//! Runtime: size observation, reactive state, and the container-query
//! coordinator.
//!
//! # Role in the workspace
//! `cq-runtime` connects a host's size-notification primitive to reactive
//! state. The host injects three capabilities: a [`SourceFactory`] that
//! creates notification sources, a [`StateCell`] (or the built-in
//! [`Observable`]) for re-render-triggering state, and an [`EffectHost`] that
//! runs commit-phase work.
//!
//! # Primary responsibilities
//! - **SizeObserverAdapter**: one source instance per consumer, target
//!   switching, stale and redundant report filtering, teardown.
//! - **ContainerQuery**: resolves each accepted size against a
//!   [`RangeTable`](cq_layout::RangeTable) and exposes the active breakpoint.
//! - **ElementSizeObserver**: the same adapter without breakpoints.
//! - **RuntimeConfig**: environment-overridable defaults.
//!
//! Everything is single-threaded and callback-driven (`Rc`/`RefCell`).
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use cq_core::{ElementHandle, SizeReport};
//! use cq_layout::BreakpointSpec;
//! use cq_runtime::{
//!     ContainerQuery, EffectHost, NotificationSource, ObserveOptions, QueryOptions,
//!     ReportCallback, ResizeEntry, SourceFactory,
//! };
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! struct Panel(u32);
//! impl ElementHandle for Panel {}
//!
//! // Hands the callback back to the caller so it can play the host.
//! #[derive(Default)]
//! struct Factory(Rc<RefCell<Option<ReportCallback<Panel>>>>);
//! struct Source;
//!
//! impl NotificationSource<Panel> for Source {
//!     fn observe(&mut self, _: &Panel, _: ObserveOptions) {}
//!     fn unobserve(&mut self, _: &Panel) {}
//!     fn disconnect(&mut self) {}
//! }
//!
//! impl SourceFactory<Panel> for Factory {
//!     type Source = Source;
//!     fn create(&self, callback: ReportCallback<Panel>) -> Source {
//!         *self.0.borrow_mut() = Some(callback);
//!         Source
//!     }
//! }
//!
//! let factory = Factory::default();
//! let callback = Rc::clone(&factory.0);
//! let options = QueryOptions::new(BreakpointSpec::explicit([
//!     ("small", 0, Some(300)),
//!     ("large", 301, None),
//! ]));
//! let query = ContainerQuery::new(&options, factory, EffectHost::default()).unwrap();
//!
//! query.assign_ref().call(Some(Panel(1)));
//! let deliver = callback.borrow().clone().unwrap();
//! deliver(&[ResizeEntry::new(Panel(1), SizeReport::border_box(480.0, 120.0))]);
//!
//! assert_eq!(&*query.active(), "large");
//! assert_eq!(query.width(), 480);
//! ```

pub mod adapter;
pub mod config;
pub mod effect;
pub mod element_observer;
pub mod query;
pub mod reactive;
pub mod source;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use adapter::{DimensionSink, SizeObserverAdapter};
pub use config::{ConfigError, RuntimeConfig, RuntimeConfigParse};
pub use effect::{
    Cleanup, Effect, EffectError, EffectHost, EffectSlot, EffectTiming, HostEnvironment,
};
pub use element_observer::ElementSizeObserver;
pub use query::{AssignRef, ContainerQuery, QueryError, QueryOptions, QueryState};
pub use reactive::{Observable, StateCell, Subscription};
pub use source::{
    BoxModel, NotificationSource, ObserveOptions, ReportCallback, ResizeEntry, SourceFactory,
};
