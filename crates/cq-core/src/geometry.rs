#![forbid(unsafe_code)]

//! Canonical dimension types.
//!
//! # Invariants
//!
//! 1. [`Dimensions`] always holds rounded, non-negative integers.
//! 2. A field of [`ObservedDimensions`] that has become `Some` never returns to
//!    `None`; [`ObservedDimensions::record`] only moves between numbers.

/// Rounded integer size of an observed element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Zero-sized dimensions, used before anything has been reported.
    pub const ZERO: Self = Self::new(0, 0);

    /// Create dimensions from already-canonical values.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Canonicalize a raw floating-point size.
    ///
    /// Rounds to the nearest integer (halves away from zero) and clamps
    /// negative or NaN input to zero.
    #[must_use]
    pub fn from_raw(width: f64, height: f64) -> Self {
        Self {
            width: round_px(width),
            height: round_px(height),
        }
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Last canonical size report, where `None` means "not yet observed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ObservedDimensions {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ObservedDimensions {
    /// Nothing observed yet.
    pub const UNOBSERVED: Self = Self {
        width: None,
        height: None,
    };

    /// Whether at least one report has been recorded.
    #[must_use]
    pub const fn is_observed(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }

    /// Whether `dims` is exactly what was last recorded.
    #[must_use]
    pub fn matches(&self, dims: Dimensions) -> bool {
        self.width == Some(dims.width) && self.height == Some(dims.height)
    }

    /// Record a new canonical report.
    ///
    /// Returns `false` when `dims` equals the recorded pair, in which case
    /// nothing changes.
    pub fn record(&mut self, dims: Dimensions) -> bool {
        if self.matches(dims) {
            return false;
        }
        self.width = Some(dims.width);
        self.height = Some(dims.height);
        true
    }

    /// The recorded pair, if both axes have been observed.
    #[must_use]
    pub fn dimensions(&self) -> Option<Dimensions> {
        Some(Dimensions::new(self.width?, self.height?))
    }
}

impl From<Dimensions> for ObservedDimensions {
    fn from(dims: Dimensions) -> Self {
        Self {
            width: Some(dims.width),
            height: Some(dims.height),
        }
    }
}

#[inline]
fn round_px(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    // `as` saturates at u32::MAX for out-of-range floats.
    value.round() as u32
}
