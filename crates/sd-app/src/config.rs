//! Dashboard configuration file.

use std::path::Path;
use std::time::Duration;

use sd_layout::LayoutConfig;
use sd_session::{PeriodSlider, SelectAllScope, SessionResult};
use serde::{Deserialize, Serialize};

use crate::status::DEFAULT_STATUS_CAPACITY;
use crate::{AppError, AppResult};

/// Analysis loop defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Period in seconds the slider starts at.
    pub default_period: f64,
    /// Slider range in `log10(seconds)`.
    pub period_log_min: f64,
    pub period_log_max: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_period: 1.0,
            period_log_min: -1.0,
            period_log_max: 2.0,
        }
    }
}

impl AnalysisConfig {
    pub fn slider(&self) -> SessionResult<PeriodSlider> {
        PeriodSlider::new(self.period_log_min, self.period_log_max, self.default_period)
    }
}

/// Routine list selection behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionPolicy {
    /// Changing the filter clears the routine selection.
    pub filter_clears_selection: bool,
    pub select_all_scope: SelectAllScope,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub layout: LayoutConfig,
    pub analysis: AnalysisConfig,
    pub selection: SelectionPolicy,
    /// Session timer tick in milliseconds.
    pub timer_tick_ms: u64,
    /// Whether plots and tables appear visible when created.
    pub panels_start_visible: bool,
    /// Ask before removing folders, files or routines.
    pub confirm_destructive: bool,
    /// Status lines kept for display.
    pub status_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            analysis: AnalysisConfig::default(),
            selection: SelectionPolicy::default(),
            timer_tick_ms: 10,
            panels_start_visible: false,
            confirm_destructive: true,
            status_capacity: DEFAULT_STATUS_CAPACITY,
        }
    }
}

impl DashboardConfig {
    pub fn timer_tick(&self) -> Duration {
        Duration::from_millis(self.timer_tick_ms)
    }

    /// Reject values the dashboard cannot start with.
    pub fn validate(&self) -> AppResult<()> {
        self.analysis
            .slider()
            .map_err(|err| AppError::InvalidInput(format!("analysis: {err}")))?;
        if self.timer_tick_ms == 0 {
            return Err(AppError::InvalidInput(
                "timer_tick_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn load_yaml(path: &Path) -> AppResult<DashboardConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let config: DashboardConfig = serde_yaml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

pub fn save_yaml(path: &Path, config: &DashboardConfig) -> AppResult<()> {
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content).map_err(|source| AppError::ConfigWrite {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
