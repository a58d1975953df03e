#![forbid(unsafe_code)]

//! Core: canonical geometry, raw size reports, and observed element handles.
//!
//! # Role in the workspace
//! `cq-core` is the boundary layer. It owns the shapes that cross the line
//! between the host's size-change notification primitive and the rest of the
//! system, and it normalizes them into a single canonical form.
//!
//! # Primary responsibilities
//! - **SizeReport**: a raw size report as the host delivers it, with an
//!   optional box-size field (scalar or sequence) and a content rectangle.
//! - **Dimensions**: the rounded integer `{width, height}` pair every other
//!   crate consumes.
//! - **ObservedDimensions**: the "not yet observed" aware variant.
//! - **ElementHandle**: what an observable target must provide.
//!
//! # How it fits in the system
//! `cq-layout` resolves widths against breakpoint tables and never sees a raw
//! report. `cq-runtime` receives [`SizeReport`]s from the notification source,
//! canonicalizes them here, and drives the reactive state.

pub mod element;
pub mod geometry;
pub mod report;

#[cfg(feature = "report-parser")]
pub mod report_parser;

pub use element::ElementHandle;
pub use geometry::{Dimensions, ObservedDimensions};
pub use report::{BoxSize, BoxSizeField, ContentRect, SizeReport};
