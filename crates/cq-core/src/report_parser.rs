#![forbid(unsafe_code)]

//! JSON size-report parser for hosts that forward observer entries as JSON.
//!
//! Accepts either a single entry object or an array of entries, where each
//! entry follows the browser's observer-entry naming:
//!
//! ```json
//! [{"borderBoxSize": [{"inlineSize": 400, "blockSize": 120}],
//!   "contentRect": {"width": 380, "height": 100}}]
//! ```
//!
//! `borderBoxSize` may be an object or an array and may be absent. Unknown
//! fields are ignored.

use serde::Deserialize;

use crate::report::{BoxSize, BoxSizeField, ContentRect, SizeReport};

/// Errors from parsing JSON size reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportParseError {
    /// Malformed JSON or a field of the wrong type.
    Json(String),
    /// Neither a box size nor a content rectangle was present.
    MissingField(&'static str),
}

impl std::fmt::Display for ReportParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON parse error: {msg}"),
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
        }
    }
}

impl std::error::Error for ReportParseError {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBoxSize {
    inline_size: f64,
    block_size: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBoxSizeField {
    Single(RawBoxSize),
    Sequence(Vec<RawBoxSize>),
}

#[derive(Debug, Deserialize)]
struct RawContentRect {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    width: f64,
    height: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    #[serde(default)]
    border_box_size: Option<RawBoxSizeField>,
    #[serde(default)]
    content_rect: Option<RawContentRect>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBatch {
    Many(Vec<RawEntry>),
    One(RawEntry),
}

impl From<RawBoxSize> for BoxSize {
    fn from(raw: RawBoxSize) -> Self {
        BoxSize::new(raw.inline_size, raw.block_size)
    }
}

/// Parse one JSON entry or an array of entries into [`SizeReport`]s.
pub fn parse_size_reports(json: &str) -> Result<Vec<SizeReport>, ReportParseError> {
    let batch: RawBatch =
        serde_json::from_str(json).map_err(|e| ReportParseError::Json(e.to_string()))?;

    let entries = match batch {
        RawBatch::Many(entries) => entries,
        RawBatch::One(entry) => vec![entry],
    };
    entries.into_iter().map(convert_entry).collect()
}

fn convert_entry(raw: RawEntry) -> Result<SizeReport, ReportParseError> {
    let border_box_size = raw.border_box_size.map(|field| match field {
        RawBoxSizeField::Single(size) => BoxSizeField::Single(size.into()),
        RawBoxSizeField::Sequence(sizes) => {
            BoxSizeField::Sequence(sizes.into_iter().map(BoxSize::from).collect())
        }
    });

    let content_rect = match raw.content_rect {
        Some(rect) => ContentRect {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        },
        // The content rect is only a fallback; without a box size there is
        // nothing to measure.
        None if border_box_size.is_some() => ContentRect::default(),
        None => return Err(ReportParseError::MissingField("contentRect")),
    };

    Ok(SizeReport {
        border_box_size,
        content_rect,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Dimensions;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_array_of_entries_with_sequence_box() {
        let json = r#"[{"borderBoxSize":[{"inlineSize":400.4,"blockSize":120}],
                        "contentRect":{"x":0,"y":0,"width":380,"height":100}}]"#;
        let reports = parse_size_reports(json).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].canonicalize(), Dimensions::new(400, 120));
    }

    #[test]
    fn parses_single_entry_with_scalar_box() {
        let json = r#"{"borderBoxSize":{"inlineSize":700,"blockSize":50}}"#;
        let reports = parse_size_reports(json).unwrap();
        assert_eq!(
            reports[0].border_box_size,
            Some(BoxSizeField::Single(BoxSize::new(700.0, 50.0)))
        );
        assert_eq!(reports[0].content_rect, ContentRect::default());
    }

    #[test]
    fn content_rect_only_entry() {
        let json = r#"{"contentRect":{"width":250.6,"height":10}}"#;
        let reports = parse_size_reports(json).unwrap();
        assert_eq!(reports[0].border_box_size, None);
        assert_eq!(reports[0].canonicalize(), Dimensions::new(251, 10));
    }

    #[test]
    fn entry_without_any_size_is_rejected() {
        let err = parse_size_reports(r#"{"target":"div"}"#).unwrap_err();
        assert_eq!(err, ReportParseError::MissingField("contentRect"));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = parse_size_reports("{not json").unwrap_err();
        assert!(matches!(err, ReportParseError::Json(_)));
        assert!(err.to_string().starts_with("JSON parse error"));
    }
}
