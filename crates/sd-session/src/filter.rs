//! Routine list filter.

use serde::{Deserialize, Serialize};

use crate::lifecycle::RoutineEntry;

/// Enumerated state keywords recognised in the filter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKeyword {
    Running,
    Paused,
    Error,
    NotRunning,
    Idle,
}

impl StateKeyword {
    pub const ALL: [StateKeyword; 5] = [
        StateKeyword::Running,
        StateKeyword::Paused,
        StateKeyword::Error,
        StateKeyword::NotRunning,
        StateKeyword::Idle,
    ];

    /// Text typed (or picked from the suggestions) to select this keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            StateKeyword::Running => "running state",
            StateKeyword::Paused => "paused state",
            StateKeyword::Error => "error state",
            StateKeyword::NotRunning => "not-running state",
            StateKeyword::Idle => "idle state",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim().to_lowercase();
        Self::ALL.into_iter().find(|k| k.keyword() == text)
    }

    pub fn matches(self, entry: &RoutineEntry) -> bool {
        let state = entry.state;
        match self {
            StateKeyword::Running => state.is_running(),
            StateKeyword::Paused => state.is_paused(),
            StateKeyword::Error => state.has_error(),
            StateKeyword::NotRunning => !state.is_running(),
            StateKeyword::Idle => !state.is_active(),
        }
    }
}

/// Current filter. Never touches lifecycle state or selection membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RoutineFilter {
    #[default]
    All,
    State(StateKeyword),
    /// Case-insensitive substring of the routine name.
    Text(String),
}

impl RoutineFilter {
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return RoutineFilter::All;
        }
        match StateKeyword::parse(trimmed) {
            Some(k) => RoutineFilter::State(k),
            None => RoutineFilter::Text(trimmed.to_lowercase()),
        }
    }

    pub fn matches(&self, entry: &RoutineEntry) -> bool {
        match self {
            RoutineFilter::All => true,
            RoutineFilter::State(k) => k.matches(entry),
            RoutineFilter::Text(needle) => entry.name.to_lowercase().contains(needle.as_str()),
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, RoutineFilter::All)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{LifecycleInput, StatusChange};
    use sd_core::RoutineId;

    fn entry(name: &str, inputs: &[LifecycleInput]) -> RoutineEntry {
        let mut e = RoutineEntry::new(RoutineId::from_filename(name), name);
        for i in inputs {
            e.apply(*i).unwrap();
        }
        e
    }

    #[test]
    fn parse_keywords_and_text() {
        assert_eq!(RoutineFilter::parse("  "), RoutineFilter::All);
        assert_eq!(
            RoutineFilter::parse("Running State"),
            RoutineFilter::State(StateKeyword::Running)
        );
        assert_eq!(
            RoutineFilter::parse("not-running state"),
            RoutineFilter::State(StateKeyword::NotRunning)
        );
        assert_eq!(RoutineFilter::parse("Fit"), RoutineFilter::Text("fit".into()));
    }

    #[test]
    fn state_keywords_match_lifecycle() {
        let idle = entry("idle.py", &[]);
        let running = entry("run.py", &[LifecycleInput::RunRequested]);
        let paused = entry(
            "pause.py",
            &[LifecycleInput::RunRequested, LifecycleInput::Pushed(StatusChange::Paused)],
        );
        let failed = entry(
            "fail.py",
            &[LifecycleInput::RunRequested, LifecycleInput::Pushed(StatusChange::Error)],
        );

        let running_filter = RoutineFilter::State(StateKeyword::Running);
        assert!(running_filter.matches(&running));
        assert!(!running_filter.matches(&paused));

        let not_running = RoutineFilter::State(StateKeyword::NotRunning);
        assert!(not_running.matches(&idle));
        assert!(not_running.matches(&paused));
        assert!(!not_running.matches(&running));

        assert!(RoutineFilter::State(StateKeyword::Error).matches(&failed));
        assert!(!RoutineFilter::State(StateKeyword::Error).matches(&idle));
        assert!(RoutineFilter::State(StateKeyword::Idle).matches(&failed));
    }

    #[test]
    fn text_match_is_case_insensitive() {
        let e = entry("FitSpectrum.py", &[]);
        assert!(RoutineFilter::parse("spectrum").matches(&e));
        assert!(!RoutineFilter::parse("scan").matches(&e));
        assert!(RoutineFilter::All.matches(&e));
    }
}
