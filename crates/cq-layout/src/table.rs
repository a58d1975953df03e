#![forbid(unsafe_code)]

//! Ordered breakpoint range tables and width resolution.
//!
//! # Invariants
//!
//! 1. A [`RangeTable`] is never empty.
//! 2. Names are unique within a table.
//! 3. Every bounded range satisfies `min <= max`.
//! 4. Declaration order is preserved and is the resolution order: the first
//!    matching range wins, so overlapping ranges resolve to the earlier one.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | No range matches | Gap in the table | [`RangeTable::resolve`] returns the previous name |
//! | Overlap | Two ranges share widths | Earlier declaration wins |
//! | Empty / duplicate / inverted input | Caller misconfiguration | Rejected at build time |

use std::rc::Rc;

use cq_core::Dimensions;
use rustc_hash::FxHashMap;

use crate::error::BreakpointError;

/// One named band `[min, max]`, where `max = None` is unbounded above.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BreakpointRange {
    pub name: Rc<str>,
    pub min: u32,
    pub max: Option<u32>,
}

impl BreakpointRange {
    /// A band with an inclusive upper bound.
    #[must_use]
    pub fn bounded(name: &str, min: u32, max: u32) -> Self {
        Self {
            name: Rc::from(name),
            min,
            max: Some(max),
        }
    }

    /// A band that matches every width from `min` upwards.
    #[must_use]
    pub fn unbounded(name: &str, min: u32) -> Self {
        Self {
            name: Rc::from(name),
            min,
            max: None,
        }
    }

    /// Whether `width` falls inside the band (both edges inclusive).
    #[inline]
    #[must_use]
    pub fn contains(&self, width: u32) -> bool {
        width >= self.min && self.max.is_none_or(|max| width <= max)
    }
}

/// Ordered, immutable mapping from breakpoint name to range.
#[derive(Debug, Clone)]
pub struct RangeTable {
    ranges: Vec<BreakpointRange>,
    index: FxHashMap<Rc<str>, usize>,
}

impl PartialEq for RangeTable {
    fn eq(&self, other: &Self) -> bool {
        self.ranges == other.ranges
    }
}

impl Eq for RangeTable {}

impl RangeTable {
    /// Build a table from ranges in declaration order.
    ///
    /// # Errors
    ///
    /// Rejects an empty input, duplicate names, and inverted ranges.
    pub fn from_ranges(
        ranges: impl IntoIterator<Item = BreakpointRange>,
    ) -> Result<Self, BreakpointError> {
        let ranges: Vec<BreakpointRange> = ranges.into_iter().collect();
        if ranges.is_empty() {
            return Err(BreakpointError::Empty);
        }

        let mut index = FxHashMap::default();
        index.reserve(ranges.len());
        for (i, range) in ranges.iter().enumerate() {
            if let Some(max) = range.max
                && range.min > max
            {
                return Err(BreakpointError::InvertedRange {
                    name: range.name.to_string(),
                    min: range.min,
                    max,
                });
            }
            if index.insert(Rc::clone(&range.name), i).is_some() {
                return Err(BreakpointError::DuplicateName(range.name.to_string()));
            }
        }

        Ok(Self { ranges, index })
    }

    /// Build a table from explicit `(name, min, max?)` entries.
    ///
    /// This is a direct pass-through; no edges are inferred.
    pub fn explicit<'a>(
        entries: impl IntoIterator<Item = (&'a str, u32, Option<u32>)>,
    ) -> Result<Self, BreakpointError> {
        Self::from_ranges(entries.into_iter().map(|(name, min, max)| BreakpointRange {
            name: Rc::from(name),
            min,
            max,
        }))
    }

    /// First-declared breakpoint name, the initial active name.
    #[must_use]
    pub fn first_name(&self) -> &Rc<str> {
        // Non-empty by construction.
        &self.ranges[0].name
    }

    /// Range declared under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BreakpointRange> {
        self.index.get(name).map(|&i| &self.ranges[i])
    }

    /// Whether `name` is declared in this table.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Ranges in declaration order.
    #[must_use]
    pub fn ranges(&self) -> &[BreakpointRange] {
        &self.ranges
    }

    /// Names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ranges.iter().map(|range| &*range.name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// First range, in declaration order, that contains `width`.
    #[must_use]
    pub fn matching(&self, width: u32) -> Option<&BreakpointRange> {
        self.ranges.iter().find(|range| range.contains(width))
    }

    /// Resolve `width` to a breakpoint name.
    ///
    /// Returns the first matching range's name, or `previous` unchanged when
    /// nothing matches. Never fails.
    #[must_use]
    pub fn resolve<'a>(&'a self, previous: &'a str, width: u32) -> &'a str {
        self.matching(width).map_or(previous, |range| &*range.name)
    }

    /// Like [`resolve`](Self::resolve), but shares the stored name.
    #[must_use]
    pub fn resolve_shared(&self, previous: &Rc<str>, width: u32) -> Rc<str> {
        self.matching(width)
            .map_or_else(|| Rc::clone(previous), |range| Rc::clone(&range.name))
    }

    /// Resolve canonical dimensions. Only the width takes part in matching.
    #[must_use]
    pub fn resolve_dimensions(&self, previous: &Rc<str>, dims: Dimensions) -> Rc<str> {
        self.resolve_shared(previous, dims.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> RangeTable {
        RangeTable::explicit([
            ("small", 0, Some(300)),
            ("med", 301, Some(600)),
            ("large", 601, Some(900)),
            ("xl", 901, None),
        ])
        .unwrap()
    }

    #[test]
    fn resolves_band_edges() {
        let table = standard();
        assert_eq!(table.resolve("small", 0), "small");
        assert_eq!(table.resolve("small", 300), "small");
        assert_eq!(table.resolve("small", 301), "med");
        assert_eq!(table.resolve("small", 600), "med");
        assert_eq!(table.resolve("small", 601), "large");
        assert_eq!(table.resolve("small", 900), "large");
        assert_eq!(table.resolve("small", 901), "xl");
        assert_eq!(table.resolve("small", u32::MAX), "xl");
    }

    #[test]
    fn no_match_keeps_previous() {
        let table = RangeTable::explicit([("a", 100, Some(200)), ("b", 300, Some(400))]).unwrap();
        assert_eq!(table.resolve("b", 250), "b");
        assert_eq!(table.resolve("a", 50), "a");
        assert_eq!(table.resolve("a", 401), "a");
    }

    #[test]
    fn overlap_resolves_to_first_declared() {
        let table = RangeTable::explicit([("wide", 0, Some(1000)), ("narrow", 0, Some(10))])
            .unwrap();
        assert_eq!(table.resolve("narrow", 5), "wide");
    }

    #[test]
    fn unbounded_range_only_bounded_below() {
        let table = RangeTable::explicit([("big", 500, None)]).unwrap();
        assert_eq!(table.resolve("big", 499), "big");
        assert!(table.matching(499).is_none());
        assert!(table.matching(500).is_some());
    }

    #[test]
    fn first_name_and_lookup() {
        let table = standard();
        assert_eq!(&**table.first_name(), "small");
        assert_eq!(table.get("large"), Some(&BreakpointRange::bounded("large", 601, 900)));
        assert!(table.contains_name("xl"));
        assert!(!table.contains_name("xxl"));
        assert_eq!(table.names().collect::<Vec<_>>(), ["small", "med", "large", "xl"]);
        assert_eq!(table.len(), 4);
        assert!(!table.is_empty());
    }

    #[test]
    fn resolve_shared_reuses_table_name() {
        let table = standard();
        let previous: Rc<str> = Rc::from("small");
        let active = table.resolve_shared(&previous, 700);
        assert!(Rc::ptr_eq(&active, &table.get("large").unwrap().name));

        let unchanged = RangeTable::explicit([("x", 10, Some(20))])
            .unwrap()
            .resolve_shared(&previous, 5);
        assert!(Rc::ptr_eq(&unchanged, &previous));
    }

    #[test]
    fn resolve_dimensions_ignores_height() {
        let table = standard();
        let previous: Rc<str> = Rc::from("small");
        let active = table.resolve_dimensions(&previous, Dimensions::new(400, 5000));
        assert_eq!(&*active, "med");
    }

    #[test]
    fn empty_input_rejected() {
        let err = RangeTable::explicit(std::iter::empty()).unwrap_err();
        assert_eq!(err, BreakpointError::Empty);
    }

    #[test]
    fn duplicate_name_rejected() {
        let err = RangeTable::explicit([("a", 0, Some(1)), ("a", 2, None)]).unwrap_err();
        assert_eq!(err, BreakpointError::DuplicateName("a".into()));
    }

    #[test]
    fn inverted_range_rejected() {
        let err = RangeTable::explicit([("bad", 10, Some(5))]).unwrap_err();
        assert_eq!(
            err,
            BreakpointError::InvertedRange {
                name: "bad".into(),
                min: 10,
                max: 5
            }
        );
        assert_eq!(err.to_string(), "breakpoint 'bad' has min 10 greater than max 5");
    }

    #[test]
    fn single_point_range_is_valid() {
        let table = RangeTable::explicit([("exact", 42, Some(42))]).unwrap();
        assert_eq!(table.resolve("exact", 42), "exact");
        assert!(table.matching(43).is_none());
    }
}
