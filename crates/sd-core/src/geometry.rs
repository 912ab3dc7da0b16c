//! Panel geometry in workspace pixels.

use serde::{Deserialize, Serialize};

use crate::numeric::{Tolerances, nearly_equal};

/// Width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height. Degenerate sizes report a square aspect.
    pub fn aspect(self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    pub fn is_positive(self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Both edges equal within `tol`.
    pub fn nearly_eq(self, other: Size, tol: Tolerances) -> bool {
        nearly_equal(self.width, other.width, tol) && nearly_equal(self.height, other.height, tol)
    }
}

/// Top-left corner of a panel inside the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}
