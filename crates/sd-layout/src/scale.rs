//! Aspect-preserving scaling.

use sd_core::Size;

use crate::{LayoutError, LayoutResult};

fn ensure_positive(size: Size) -> LayoutResult<Size> {
    if size.is_positive() && size.width.is_finite() && size.height.is_finite() {
        Ok(size)
    } else {
        Err(LayoutError::DegenerateSize {
            width: size.width,
            height: size.height,
        })
    }
}

/// Uniform factor that fits `natural` inside `bound`, capped at `cap`.
pub fn scale_factor(natural: Size, bound: Size, cap: f32) -> LayoutResult<f32> {
    let natural = ensure_positive(natural)?;
    let bound = ensure_positive(bound)?;
    Ok((bound.width / natural.width)
        .min(bound.height / natural.height)
        .min(cap))
}

/// Fit `natural` inside `bound`, never scaling up.
pub fn fit_within(natural: Size, bound: Size) -> LayoutResult<Size> {
    Ok(natural.scaled(scale_factor(natural, bound, 1.0)?))
}

/// Scale `natural` by `factor`, shrinking further only if the result would
/// overflow `bound`.
pub fn fit_with_factor(natural: Size, bound: Size, factor: f32) -> LayoutResult<Size> {
    Ok(natural.scaled(scale_factor(natural, bound, factor)?))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn fitted_size_stays_inside_bound_and_keeps_aspect(
            w in 1.0_f32..5000.0,
            h in 1.0_f32..5000.0,
            bw in 30.0_f32..3000.0,
            bh in 30.0_f32..3000.0,
        ) {
            let fitted = fit_within(Size::new(w, h), Size::new(bw, bh)).unwrap();
            let slack = 1e-3;
            prop_assert!(fitted.width <= bw * (1.0 + slack));
            prop_assert!(fitted.height <= bh * (1.0 + slack));
            prop_assert!(fitted.width <= w * (1.0 + slack));
            let expected = w / h;
            let actual = fitted.width / fitted.height;
            prop_assert!((actual - expected).abs() <= expected * 1e-4);
        }
    }
}
