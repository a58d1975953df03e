#![forbid(unsafe_code)]

//! Threshold lists: one boundary value per breakpoint, edges inferred.
//!
//! A threshold list names a single edge of each band. [`ValueType`] says
//! which edge, and the opposite edge is inferred from the neighbouring
//! entry. One extra band, named by the implicit key, covers whatever the
//! declared entries leave open at the far end.
//!
//! ```text
//! Max: [small:300, med:600, large:900]
//!   small [0, 300]  med [301, 600]  large [601, 900]  max [901, ∞)
//!
//! Min: [med:300, large:600, xl:900]
//!   min [0, 299]  med [300, 599]  large [600, 899]  xl [900, ∞)
//! ```
//!
//! When a min-mode list starts at 0 the implicit lower band would be empty
//! and is left out.

use std::rc::Rc;

use crate::error::BreakpointError;
use crate::table::{BreakpointRange, RangeTable};

/// Which edge of its band a threshold denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Thresholds are lower edges; an implicit band sits below the first.
    Min,
    /// Thresholds are upper edges; an implicit band sits above the last.
    Max,
}

impl ValueType {
    /// Name given to the implicit band when none is configured.
    #[must_use]
    pub const fn default_implicit_key(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `name: threshold` record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThresholdEntry {
    pub name: String,
    pub threshold: u32,
}

impl ThresholdEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, threshold: u32) -> Self {
        Self {
            name: name.into(),
            threshold,
        }
    }
}

impl<S: Into<String>> From<(S, u32)> for ThresholdEntry {
    fn from((name, threshold): (S, u32)) -> Self {
        Self::new(name, threshold)
    }
}

/// Derive the full range table from a threshold list.
///
/// # Errors
///
/// Returns [`BreakpointError::Empty`] for an empty list,
/// [`BreakpointError::DuplicateName`] when a name repeats or clashes with the
/// implicit key, and [`BreakpointError::UnorderedThreshold`] when the
/// thresholds are not strictly ascending.
pub fn derive_table(
    entries: &[ThresholdEntry],
    value_type: ValueType,
    implicit_key: Option<&str>,
) -> Result<RangeTable, BreakpointError> {
    let (Some(first), Some(last)) = (entries.first(), entries.last()) else {
        return Err(BreakpointError::Empty);
    };
    if let Some(pair) = entries
        .windows(2)
        .find(|pair| pair[1].threshold <= pair[0].threshold)
    {
        return Err(BreakpointError::UnorderedThreshold {
            name: pair[1].name.clone(),
            threshold: pair[1].threshold,
            previous: pair[0].threshold,
        });
    }
    let implicit: Rc<str> = Rc::from(implicit_key.unwrap_or(value_type.default_implicit_key()));

    let mut ranges = Vec::with_capacity(entries.len() + 1);
    match value_type {
        ValueType::Max => {
            let mut lower = 0u32;
            for entry in entries {
                ranges.push(band(&entry.name, lower, Some(entry.threshold)));
                lower = entry.threshold.saturating_add(1);
            }
            ranges.push(BreakpointRange {
                name: implicit,
                min: last.threshold.saturating_add(1),
                max: None,
            });
        }
        ValueType::Min => {
            if first.threshold > 0 {
                ranges.push(BreakpointRange {
                    name: implicit,
                    min: 0,
                    max: Some(first.threshold - 1),
                });
            }
            for (i, entry) in entries.iter().enumerate() {
                let upper = entries
                    .get(i + 1)
                    .map(|next| next.threshold.saturating_sub(1));
                ranges.push(band(&entry.name, entry.threshold, upper));
            }
        }
    }

    RangeTable::from_ranges(ranges)
}

fn band(name: &str, min: u32, max: Option<u32>) -> BreakpointRange {
    BreakpointRange {
        name: Rc::from(name),
        min,
        max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entries(list: &[(&str, u32)]) -> Vec<ThresholdEntry> {
        list.iter().map(|&(name, t)| ThresholdEntry::new(name, t)).collect()
    }

    #[test]
    fn max_mode_infers_lower_edges_and_trailing_band() {
        let table = derive_table(
            &entries(&[("small", 300), ("med", 600), ("large", 900)]),
            ValueType::Max,
            None,
        )
        .unwrap();

        assert_eq!(
            table.ranges(),
            &[
                BreakpointRange::bounded("small", 0, 300),
                BreakpointRange::bounded("med", 301, 600),
                BreakpointRange::bounded("large", 601, 900),
                BreakpointRange::unbounded("max", 901),
            ]
        );
    }

    #[test]
    fn min_mode_infers_upper_edges_and_leading_band() {
        let table = derive_table(
            &entries(&[("med", 300), ("large", 600), ("xl", 900)]),
            ValueType::Min,
            None,
        )
        .unwrap();

        assert_eq!(
            table.ranges(),
            &[
                BreakpointRange::bounded("min", 0, 299),
                BreakpointRange::bounded("med", 300, 599),
                BreakpointRange::bounded("large", 600, 899),
                BreakpointRange::unbounded("xl", 900),
            ]
        );
    }

    #[test]
    fn custom_implicit_key() {
        let table = derive_table(&entries(&[("s", 100)]), ValueType::Max, Some("huge")).unwrap();
        assert_eq!(table.names().collect::<Vec<_>>(), ["s", "huge"]);

        let table = derive_table(&entries(&[("s", 100)]), ValueType::Min, Some("tiny")).unwrap();
        assert_eq!(table.names().collect::<Vec<_>>(), ["tiny", "s"]);
    }

    #[test]
    fn single_entry_still_gets_implicit_band() {
        let table = derive_table(&entries(&[("only", 500)]), ValueType::Max, None).unwrap();
        assert_eq!(table.get("max"), Some(&BreakpointRange::unbounded("max", 501)));

        let table = derive_table(&entries(&[("only", 500)]), ValueType::Min, None).unwrap();
        assert_eq!(table.get("min"), Some(&BreakpointRange::bounded("min", 0, 499)));
        assert_eq!(table.get("only"), Some(&BreakpointRange::unbounded("only", 500)));
    }

    #[test]
    fn min_mode_starting_at_zero_has_no_implicit_band() {
        let table = derive_table(&entries(&[("a", 0), ("b", 10)]), ValueType::Min, None).unwrap();
        assert_eq!(table.names().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(table.resolve("a", 0), "a");
    }

    #[test]
    fn implicit_key_clash_is_duplicate() {
        let err = derive_table(&entries(&[("max", 10)]), ValueType::Max, None).unwrap_err();
        assert_eq!(err, BreakpointError::DuplicateName("max".into()));
    }

    #[test]
    fn descending_thresholds_rejected() {
        for value_type in [ValueType::Max, ValueType::Min] {
            let err = derive_table(&entries(&[("a", 600), ("b", 300)]), value_type, None)
                .unwrap_err();
            assert_eq!(
                err,
                BreakpointError::UnorderedThreshold {
                    name: "b".into(),
                    threshold: 300,
                    previous: 600,
                }
            );
        }
    }

    #[test]
    fn repeated_threshold_rejected() {
        for value_type in [ValueType::Max, ValueType::Min] {
            let err = derive_table(&entries(&[("a", 300), ("b", 300)]), value_type, None)
                .unwrap_err();
            assert!(matches!(err, BreakpointError::UnorderedThreshold { ref name, .. } if name == "b"));
        }
    }

    #[test]
    fn repeated_zero_threshold_rejected_in_min_mode() {
        let err = derive_table(&entries(&[("a", 0), ("b", 0)]), ValueType::Min, None).unwrap_err();
        assert_eq!(
            err,
            BreakpointError::UnorderedThreshold {
                name: "b".into(),
                threshold: 0,
                previous: 0,
            }
        );
        assert_eq!(
            err.to_string(),
            "breakpoint 'b' threshold 0 does not exceed previous threshold 0"
        );
    }

    #[test]
    fn empty_list_rejected() {
        assert_eq!(
            derive_table(&[], ValueType::Min, None).unwrap_err(),
            BreakpointError::Empty
        );
    }

    #[test]
    fn value_type_display() {
        assert_eq!(ValueType::Min.to_string(), "min");
        assert_eq!(ValueType::Max.default_implicit_key(), "max");
    }
}
