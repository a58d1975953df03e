#![forbid(unsafe_code)]

//! Errors raised while building a range table.

use std::fmt;

/// Structural problem between two ranges, found by validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeIssue {
    /// Two ranges share at least one width. The earlier-declared range wins
    /// during resolution.
    Overlap {
        first: String,
        second: String,
        /// Smallest width covered by both.
        at: u32,
    },
    /// Widths in `[from, to]` match no range; resolution keeps the previous
    /// breakpoint there.
    Gap { from: u32, to: u32 },
}

impl fmt::Display for RangeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overlap { first, second, at } => {
                write!(f, "ranges '{first}' and '{second}' overlap from width {at}")
            }
            Self::Gap { from, to } => write!(f, "no range covers widths {from}..={to}"),
        }
    }
}

/// Errors from building a [`RangeTable`](crate::RangeTable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakpointError {
    /// No breakpoints were declared.
    Empty,
    /// The same name was declared twice (including a clash with the implicit
    /// breakpoint key of a threshold list).
    DuplicateName(String),
    /// A range whose `min` exceeds its `max`.
    InvertedRange { name: String, min: u32, max: u32 },
    /// A threshold not strictly greater than the one declared before it.
    UnorderedThreshold {
        name: String,
        threshold: u32,
        previous: u32,
    },
    /// Rejected by [`ValidationMode::Reject`](crate::ValidationMode::Reject).
    Validation(RangeIssue),
}

impl fmt::Display for BreakpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("breakpoint table is empty"),
            Self::DuplicateName(name) => write!(f, "duplicate breakpoint name '{name}'"),
            Self::InvertedRange { name, min, max } => {
                write!(f, "breakpoint '{name}' has min {min} greater than max {max}")
            }
            Self::UnorderedThreshold {
                name,
                threshold,
                previous,
            } => write!(
                f,
                "breakpoint '{name}' threshold {threshold} does not exceed previous threshold {previous}"
            ),
            Self::Validation(issue) => write!(f, "invalid breakpoint table: {issue}"),
        }
    }
}

impl std::error::Error for BreakpointError {}
