//! Uniform row height slider.

use serde::{Deserialize, Serialize};

/// Slider whose value mirrors the mean height of the visible panels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowHeightSlider {
    pub value: f32,
    pub min: f32,
    pub max: f32,
}

impl RowHeightSlider {
    pub fn new(min: f32, max: f32) -> Self {
        let max = max.max(min);
        Self {
            value: min,
            min,
            max,
        }
    }

    pub fn clamp(&self, height: f32) -> f32 {
        height.clamp(self.min, self.max)
    }

    /// User moved the slider; returns the accepted height.
    pub fn set(&mut self, height: f32) -> f32 {
        self.value = self.clamp(height);
        self.value
    }

    /// Follow the mean visible height. With nothing visible the value stays.
    ///
    /// The range stretches to include the mean, so the displayed value is the
    /// true mean even for panels smaller than the minimum edge.
    pub fn sync_to_mean(&mut self, mean: Option<f32>) {
        if let Some(mean) = mean.filter(|m| m.is_finite() && *m > 0.0) {
            self.min = self.min.min(mean);
            self.max = self.max.max(mean);
            self.value = mean;
        }
    }

    /// The slider range follows the bounded box.
    pub fn set_max(&mut self, max: f32) {
        self.max = max.max(self.min);
        self.value = self.clamp(self.value);
    }
}
