#![forbid(unsafe_code)]

//! Raw size reports and their canonicalization.
//!
//! Hosts disagree on the shape of a size report: some expose the border box
//! as a single record, some as a sequence of fragments, and some only provide
//! a content rectangle. [`SizeReport::canonicalize`] folds all of these into a
//! single [`Dimensions`] pair so nothing downstream has to care.
//!
//! # Precedence
//!
//! | Report contents                     | Source of truth            |
//! |-------------------------------------|----------------------------|
//! | `border_box_size: Single(b)`        | `b`                        |
//! | `border_box_size: Sequence([b, ..])`| first fragment `b`         |
//! | `border_box_size: Sequence([])`     | `content_rect`             |
//! | `border_box_size: None`             | `content_rect`             |

use crate::geometry::Dimensions;

/// Logical box size: `inline_size` is the width axis, `block_size` the height
/// axis in horizontal writing modes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxSize {
    pub inline_size: f64,
    pub block_size: f64,
}

impl BoxSize {
    #[must_use]
    pub const fn new(inline_size: f64, block_size: f64) -> Self {
        Self {
            inline_size,
            block_size,
        }
    }
}

/// The box-size field of a report, which may be a scalar or a sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxSizeField {
    Single(BoxSize),
    /// One entry per fragment; the first is authoritative.
    Sequence(Vec<BoxSize>),
}

impl BoxSizeField {
    /// The authoritative box size, if any.
    #[must_use]
    pub fn primary(&self) -> Option<BoxSize> {
        match self {
            Self::Single(size) => Some(*size),
            Self::Sequence(sizes) => sizes.first().copied(),
        }
    }
}

impl From<BoxSize> for BoxSizeField {
    fn from(size: BoxSize) -> Self {
        Self::Single(size)
    }
}

impl From<Vec<BoxSize>> for BoxSizeField {
    fn from(sizes: Vec<BoxSize>) -> Self {
        Self::Sequence(sizes)
    }
}

/// Content rectangle of the observed element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContentRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ContentRect {
    /// A rectangle anchored at the origin.
    #[must_use]
    pub const fn sized(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }
}

/// One raw size report for a single observed element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SizeReport {
    /// Border-box size, when the host supports it.
    pub border_box_size: Option<BoxSizeField>,
    pub content_rect: ContentRect,
}

impl SizeReport {
    /// Report carrying a scalar border box and a matching content rectangle.
    #[must_use]
    pub fn border_box(width: f64, height: f64) -> Self {
        Self {
            border_box_size: Some(BoxSizeField::Single(BoxSize::new(width, height))),
            content_rect: ContentRect::sized(width, height),
        }
    }

    /// Report from a host that only provides a content rectangle.
    #[must_use]
    pub fn content_only(width: f64, height: f64) -> Self {
        Self {
            border_box_size: None,
            content_rect: ContentRect::sized(width, height),
        }
    }

    /// Replace the box-size field.
    #[must_use]
    pub fn with_border_box_size(mut self, field: impl Into<BoxSizeField>) -> Self {
        self.border_box_size = Some(field.into());
        self
    }

    /// Fold the report into rounded integer dimensions, preferring the box
    /// size over the content rectangle.
    #[must_use]
    pub fn canonicalize(&self) -> Dimensions {
        match self.border_box_size.as_ref().and_then(BoxSizeField::primary) {
            Some(size) => Dimensions::from_raw(size.inline_size, size.block_size),
            None => Dimensions::from_raw(self.content_rect.width, self.content_rect.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_border_box_wins_over_content_rect() {
        let report = SizeReport {
            border_box_size: Some(BoxSize::new(420.4, 80.6).into()),
            content_rect: ContentRect::sized(400.0, 60.0),
        };
        assert_eq!(report.canonicalize(), Dimensions::new(420, 81));
    }

    #[test]
    fn sequence_uses_first_fragment() {
        let report = SizeReport::content_only(1.0, 1.0).with_border_box_size(vec![
            BoxSize::new(610.0, 200.0),
            BoxSize::new(90.0, 10.0),
        ]);
        assert_eq!(report.canonicalize(), Dimensions::new(610, 200));
    }

    #[test]
    fn empty_sequence_falls_back_to_content_rect() {
        let report = SizeReport::content_only(250.2, 40.0).with_border_box_size(Vec::new());
        assert_eq!(report.canonicalize(), Dimensions::new(250, 40));
    }

    #[test]
    fn content_only_report() {
        assert_eq!(
            SizeReport::content_only(299.5, 10.0).canonicalize(),
            Dimensions::new(300, 10)
        );
    }

    #[test]
    fn default_report_is_zero() {
        assert_eq!(SizeReport::default().canonicalize(), Dimensions::ZERO);
    }
}
