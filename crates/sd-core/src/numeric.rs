use crate::CoreError;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: f32,
    pub rel: f32,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-4,
            rel: 1e-4,
        }
    }
}

pub fn nearly_equal(a: f32, b: f32, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}
