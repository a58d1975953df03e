//! Canonicalization invariants for size reports.
//!
//! 1. Rounding is to nearest, halves away from zero.
//! 2. Negative, zero, and NaN sizes clamp to 0.
//! 3. A non-empty box size always wins over the content rectangle.
//! 4. An absent or empty box size falls back to the content rectangle.
//! 5. Only the first element of a box-size sequence counts.

use cq_core::{BoxSize, Dimensions, ObservedDimensions, SizeReport};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn px() -> impl Strategy<Value = f64> {
    0.0f64..=10_000.0
}

#[test]
fn halves_round_away_from_zero() {
    assert_eq!(Dimensions::from_raw(0.5, 1.5), Dimensions::new(1, 2));
    assert_eq!(Dimensions::from_raw(299.49, 300.5), Dimensions::new(299, 301));
}

#[test]
fn invalid_sizes_clamp_to_zero() {
    assert_eq!(Dimensions::from_raw(-4.0, f64::NAN), Dimensions::ZERO);
}

#[test]
fn observed_dimensions_never_revert() {
    let mut observed = ObservedDimensions::UNOBSERVED;
    assert!(!observed.is_observed());
    assert!(observed.record(Dimensions::new(10, 20)));
    assert!(!observed.record(Dimensions::new(10, 20)));
    assert!(observed.record(Dimensions::ZERO));
    assert_eq!(observed.dimensions(), Some(Dimensions::ZERO));
}

proptest! {
    #[test]
    fn rounding_is_within_half_a_pixel(w in px(), h in px()) {
        let dims = Dimensions::from_raw(w, h);
        prop_assert!((f64::from(dims.width) - w).abs() <= 0.5);
        prop_assert!((f64::from(dims.height) - h).abs() <= 0.5);
    }

    #[test]
    fn box_size_wins(bw in px(), bh in px(), cw in px(), ch in px()) {
        let report = SizeReport::content_only(cw, ch)
            .with_border_box_size(BoxSize::new(bw, bh));
        prop_assert_eq!(report.canonicalize(), Dimensions::from_raw(bw, bh));
    }

    #[test]
    fn first_sequence_element_wins(
        sizes in proptest::collection::vec((px(), px()), 1..4),
        cw in px(),
        ch in px(),
    ) {
        let boxes: Vec<BoxSize> = sizes.iter().map(|&(w, h)| BoxSize::new(w, h)).collect();
        let report = SizeReport::content_only(cw, ch).with_border_box_size(boxes);
        prop_assert_eq!(report.canonicalize(), Dimensions::from_raw(sizes[0].0, sizes[0].1));
    }

    #[test]
    fn content_rect_is_the_fallback(cw in px(), ch in px()) {
        let bare = SizeReport::content_only(cw, ch);
        let empty = SizeReport::content_only(cw, ch).with_border_box_size(Vec::<BoxSize>::new());
        prop_assert_eq!(bare.canonicalize(), Dimensions::from_raw(cw, ch));
        prop_assert_eq!(empty.canonicalize(), Dimensions::from_raw(cw, ch));
    }
}
