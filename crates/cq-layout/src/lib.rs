#![forbid(unsafe_code)]

//! Layout: breakpoint range tables and width resolution.
//!
//! # Role in the workspace
//! `cq-layout` is pure and deterministic. It turns breakpoint configuration
//! into an ordered [`RangeTable`] and resolves a canonical width to exactly
//! one breakpoint name. It holds no state beyond the optional
//! [`RangeTableMemo`].
//!
//! # Primary responsibilities
//! - **BreakpointSpec**: explicit `name -> [min, max?]` ranges or a sparse
//!   threshold list, deserializable from JSON.
//! - **Threshold derivation**: infers the missing edge of each band and the
//!   implicit band at the open end.
//! - **Resolution**: first match wins; no match keeps the previous name.
//! - **Validation**: optional overlap and gap reporting.
//!
//! # Example
//!
//! ```
//! use cq_layout::{BreakpointSpec, ValueType};
//!
//! let table = BreakpointSpec::thresholds([("small", 300), ("med", 600)], ValueType::Max)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(table.resolve("small", 450), "med");
//! assert_eq!(table.resolve("small", 601), "max");
//! ```

pub mod error;
pub mod memo;
pub mod spec;
pub mod table;
pub mod threshold;
pub mod validate;

pub use error::{BreakpointError, RangeIssue};
pub use memo::RangeTableMemo;
pub use spec::{BreakpointSpec, ExplicitRange};
pub use table::{BreakpointRange, RangeTable};
pub use threshold::{ThresholdEntry, ValueType, derive_table};
pub use validate::{ValidationMode, find_issues};
