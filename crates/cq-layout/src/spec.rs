#![forbid(unsafe_code)]

//! Breakpoint configuration in either of its two input modes.
//!
//! # JSON shape
//!
//! Explicit ranges (object order is the resolution order):
//!
//! ```json
//! {"breakpoints": {"small": [0, 300], "med": [301, 600], "xl": [601]}}
//! ```
//!
//! Threshold list:
//!
//! ```json
//! {"breakpoints": [{"small": 300}, {"med": 600}], "valueType": "max",
//!  "implicitBreakpointKey": "huge"}
//! ```

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;

use crate::error::BreakpointError;
use crate::table::RangeTable;
use crate::threshold::{ThresholdEntry, ValueType, derive_table};

/// One explicit `name: [min, max?]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExplicitRange {
    pub name: String,
    pub min: u32,
    pub max: Option<u32>,
}

impl ExplicitRange {
    #[must_use]
    pub fn new(name: impl Into<String>, min: u32, max: Option<u32>) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }
}

/// Breakpoint configuration as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakpointSpec {
    /// Fully specified ranges, passed through unchanged.
    Explicit(Vec<ExplicitRange>),
    /// Single-edge thresholds with the other edges inferred.
    Threshold {
        entries: Vec<ThresholdEntry>,
        value_type: ValueType,
        implicit_key: Option<String>,
    },
}

impl BreakpointSpec {
    /// Explicit configuration from `(name, min, max?)` tuples.
    #[must_use]
    pub fn explicit<'a>(entries: impl IntoIterator<Item = (&'a str, u32, Option<u32>)>) -> Self {
        Self::Explicit(
            entries
                .into_iter()
                .map(|(name, min, max)| ExplicitRange::new(name, min, max))
                .collect(),
        )
    }

    /// Threshold configuration with the default implicit key.
    #[must_use]
    pub fn thresholds<'a>(
        entries: impl IntoIterator<Item = (&'a str, u32)>,
        value_type: ValueType,
    ) -> Self {
        Self::Threshold {
            entries: entries.into_iter().map(ThresholdEntry::from).collect(),
            value_type,
            implicit_key: None,
        }
    }

    /// Override the implicit key. No effect on explicit configuration.
    #[must_use]
    pub fn with_implicit_key(mut self, key: impl Into<String>) -> Self {
        if let Self::Threshold { implicit_key, .. } = &mut self {
            *implicit_key = Some(key.into());
        }
        self
    }

    /// Build the fully specified range table.
    pub fn build(&self) -> Result<RangeTable, BreakpointError> {
        match self {
            Self::Explicit(ranges) => RangeTable::explicit(
                ranges
                    .iter()
                    .map(|range| (range.name.as_str(), range.min, range.max)),
            ),
            Self::Threshold {
                entries,
                value_type,
                implicit_key,
            } => derive_table(entries, *value_type, implicit_key.as_deref()),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSpec {
    breakpoints: RawBreakpoints,
    #[serde(default)]
    value_type: Option<ValueType>,
    #[serde(default)]
    implicit_breakpoint_key: Option<String>,
}

enum RawBreakpoints {
    Ranges(Vec<ExplicitRange>),
    Thresholds(Vec<ThresholdEntry>),
}

impl<'de> Deserialize<'de> for BreakpointSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawSpec::deserialize(deserializer)?;
        match raw.breakpoints {
            RawBreakpoints::Ranges(ranges) => Ok(Self::Explicit(ranges)),
            RawBreakpoints::Thresholds(entries) => {
                let value_type = raw
                    .value_type
                    .ok_or_else(|| de::Error::missing_field("valueType"))?;
                Ok(Self::Threshold {
                    entries,
                    value_type,
                    implicit_key: raw.implicit_breakpoint_key,
                })
            }
        }
    }
}

impl<'de> Deserialize<'de> for RawBreakpoints {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(BreakpointsVisitor)
    }
}

struct BreakpointsVisitor;

impl<'de> Visitor<'de> for BreakpointsVisitor {
    type Value = RawBreakpoints;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of name to [min, max?] or a list of {name: threshold}")
    }

    // Entries are collected in document order, which is the resolution order.
    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut ranges = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((name, bounds)) = map.next_entry::<String, Vec<u32>>()? {
            let (min, max) = match bounds.as_slice() {
                [min] => (*min, None),
                [min, max] => (*min, Some(*max)),
                _ => {
                    return Err(de::Error::invalid_length(
                        bounds.len(),
                        &"[min] or [min, max]",
                    ));
                }
            };
            ranges.push(ExplicitRange::new(name, min, max));
        }
        Ok(RawBreakpoints::Ranges(ranges))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(record) = seq.next_element::<ThresholdRecord>()? {
            entries.push(record.0);
        }
        Ok(RawBreakpoints::Thresholds(entries))
    }
}

/// A `{name: threshold}` record with exactly one key.
struct ThresholdRecord(ThresholdEntry);

impl<'de> Deserialize<'de> for ThresholdRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = ThresholdRecord;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a single-key {name: threshold} record")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let Some((name, threshold)) = map.next_entry::<String, u32>()? else {
                    return Err(de::Error::invalid_length(0, &self));
                };
                if map.next_key::<de::IgnoredAny>()?.is_some() {
                    return Err(de::Error::invalid_length(2, &self));
                }
                Ok(ThresholdRecord(ThresholdEntry::new(name, threshold)))
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}
