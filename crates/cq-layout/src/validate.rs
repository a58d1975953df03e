#![forbid(unsafe_code)]

//! Optional overlap and gap detection for range tables.
//!
//! Tables are not validated by default: overlapping ranges resolve to the
//! earlier declaration and gaps keep the previous breakpoint. Validation only
//! reports (or rejects) those situations; it never changes resolution.

use tracing::warn;

use crate::error::{BreakpointError, RangeIssue};
use crate::table::{BreakpointRange, RangeTable};

/// How a coordinator treats overlaps and gaps in its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValidationMode {
    /// Accept the table as-is.
    #[default]
    Off,
    /// Accept the table and log each issue at `warn`.
    Warn,
    /// Reject the table on the first issue.
    Reject,
}

impl ValidationMode {
    /// Parse `off|warn|reject` (case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Some(Self::Off),
            "warn" => Some(Self::Warn),
            "reject" | "strict" => Some(Self::Reject),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Warn => "warn",
            Self::Reject => "reject",
        }
    }

    /// Apply the mode to `table`.
    ///
    /// # Errors
    ///
    /// In [`Reject`](Self::Reject) mode, returns the first issue found.
    pub fn check(self, table: &RangeTable) -> Result<(), BreakpointError> {
        match self {
            Self::Off => Ok(()),
            Self::Warn => {
                for issue in find_issues(table) {
                    warn!(%issue, "breakpoint table issue");
                }
                Ok(())
            }
            Self::Reject => match find_issues(table).into_iter().next() {
                Some(issue) => Err(BreakpointError::Validation(issue)),
                None => Ok(()),
            },
        }
    }
}

impl std::fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every overlap and gap between ranges, ordered by width.
///
/// Ranges are compared in ascending order of `min`. A gap is reported
/// between two neighbours that leave widths uncovered, including a gap below
/// the lowest range when it does not start at 0.
#[must_use]
pub fn find_issues(table: &RangeTable) -> Vec<RangeIssue> {
    let mut sorted: Vec<&BreakpointRange> = table.ranges().iter().collect();
    sorted.sort_by_key(|range| range.min);

    let mut issues = Vec::new();
    if let Some(lowest) = sorted.first()
        && lowest.min > 0
    {
        issues.push(RangeIssue::Gap {
            from: 0,
            to: lowest.min - 1,
        });
    }

    // Highest upper edge seen so far and the range that set it.
    let mut reach: Option<(&BreakpointRange, Option<u32>)> = None;
    for range in sorted {
        if let Some((holder, covered)) = reach {
            match covered {
                None => issues.push(overlap(holder, range, range.min)),
                Some(covered) if range.min <= covered => {
                    issues.push(overlap(holder, range, range.min));
                }
                Some(covered) if range.min > covered.saturating_add(1) => {
                    issues.push(RangeIssue::Gap {
                        from: covered + 1,
                        to: range.min - 1,
                    });
                }
                Some(_) => {}
            }
            let extends = match (covered, range.max) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(covered), Some(max)) => max > covered,
            };
            if extends {
                reach = Some((range, range.max));
            }
        } else {
            reach = Some((range, range.max));
        }
    }
    issues
}

fn overlap(first: &BreakpointRange, second: &BreakpointRange, at: u32) -> RangeIssue {
    RangeIssue::Overlap {
        first: first.name.to_string(),
        second: second.name.to_string(),
        at,
    }
}
