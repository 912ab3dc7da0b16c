//! Analysis loop controls and the logarithmic period slider.

use core::fmt;

use sd_core::numeric::ensure_finite;
use serde::{Deserialize, Serialize};

use crate::{SessionError, SessionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPhase {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnalysisPhase::Stopped => "stopped",
            AnalysisPhase::Running => "running",
            AnalysisPhase::Paused => "paused",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisButtons {
    pub start: bool,
    pub pause: bool,
    pub stop: bool,
    pub slider_enabled: bool,
}

/// Slider over `log10(period)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodSlider {
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl PeriodSlider {
    /// Slider over `[min, max]` in `log10(seconds)`, starting at `period`.
    pub fn new(min: f64, max: f64, period: f64) -> SessionResult<Self> {
        let min = ensure_finite(min, "period slider minimum")?;
        let max = ensure_finite(max, "period slider maximum")?;
        let mut slider = Self {
            value: min,
            min,
            max: max.max(min),
            step: 0.001,
        };
        slider.set_period(period)?;
        Ok(slider)
    }

    /// Period in seconds.
    pub fn period(&self) -> f64 {
        10f64.powf(self.value)
    }

    /// Slider moved. Snaps to the step and clamps to the range.
    pub fn set_value(&mut self, value: f64) -> SessionResult<f64> {
        let value = ensure_finite(value, "period slider value")?;
        let snapped = (value / self.step).round() * self.step;
        self.value = snapped.clamp(self.min, self.max);
        Ok(self.period())
    }

    /// Period typed into the text field.
    pub fn set_period(&mut self, period: f64) -> SessionResult<f64> {
        let period = ensure_finite(period, "period")?;
        if period <= 0.0 {
            return Err(SessionError::Core(sd_core::CoreError::InvalidArg {
                what: "period must be positive",
            }));
        }
        self.set_value(period.log10())
    }

    /// Period with three significant digits.
    pub fn display(&self) -> String {
        format_significant(self.period(), 3)
    }
}

impl Default for PeriodSlider {
    /// 0.1 s to 100 s, starting at one second.
    fn default() -> Self {
        Self {
            value: 0.0,
            min: -1.0,
            max: 2.0,
            step: 0.001,
        }
    }
}

fn format_significant(x: f64, digits: i32) -> String {
    if x <= 0.0 || !x.is_finite() {
        return "0".to_string();
    }
    // exponent after rounding, so 99.9996 counts as 1.00e2
    let precision = (digits - 1).max(0) as usize;
    let scientific = format!("{x:.precision$e}");
    let exponent = scientific
        .split_once('e')
        .and_then(|(_, e)| e.parse::<i32>().ok())
        .unwrap_or(0);
    let decimals = (digits - 1 - exponent).max(0) as usize;
    format!("{x:.decimals$}")
}

/// Analysis loop state driven by the start/pause/stop buttons.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisControl {
    phase: AnalysisPhase,
    pub slider: PeriodSlider,
    /// Set by a fresh start; the workspace is cleared when the server
    /// acknowledges it.
    clear_on_ack: bool,
    warned: bool,
}

impl AnalysisControl {
    pub fn new(slider: PeriodSlider) -> Self {
        Self {
            slider,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> AnalysisPhase {
        self.phase
    }

    /// Start or resume. Returns true when resuming from pause.
    pub fn start(&mut self) -> SessionResult<bool> {
        let resume = match self.phase {
            AnalysisPhase::Stopped => false,
            AnalysisPhase::Paused => true,
            AnalysisPhase::Running => return Err(self.refuse("start")),
        };
        self.clear_on_ack = !resume;
        self.phase = AnalysisPhase::Running;
        Ok(resume)
    }

    pub fn pause(&mut self) -> SessionResult<()> {
        if self.phase != AnalysisPhase::Running {
            return Err(self.refuse("pause"));
        }
        self.phase = AnalysisPhase::Paused;
        Ok(())
    }

    pub fn stop(&mut self) -> SessionResult<()> {
        if self.phase == AnalysisPhase::Stopped {
            return Err(self.refuse("stop"));
        }
        self.phase = AnalysisPhase::Stopped;
        self.clear_on_ack = false;
        Ok(())
    }

    /// Server acknowledged the start. Returns true once per fresh start.
    pub fn acknowledge_start(&mut self) -> bool {
        std::mem::take(&mut self.clear_on_ack)
    }

    /// Server reported the loop stopped, also when it ended on its own.
    pub fn acknowledge_stop(&mut self) {
        self.phase = AnalysisPhase::Stopped;
        self.clear_on_ack = false;
    }

    /// Period warning push; true only the first time.
    pub fn warn_period(&mut self) -> bool {
        !std::mem::replace(&mut self.warned, true)
    }

    pub fn buttons(&self) -> AnalysisButtons {
        AnalysisButtons {
            start: self.phase != AnalysisPhase::Running,
            pause: self.phase == AnalysisPhase::Running,
            stop: self.phase != AnalysisPhase::Stopped,
            slider_enabled: self.phase != AnalysisPhase::Running,
        }
    }

    fn refuse(&self, action: &'static str) -> SessionError {
        SessionError::AnalysisPhase {
            action,
            phase: self.phase,
        }
    }
}
