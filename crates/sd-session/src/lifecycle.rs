//! Routine entries and their run state machine.
//!
//! Local user actions only ever produce the optimistic `running` flip (to
//! block duplicate run requests) or mark a request as pending. Every other
//! state change comes from a server push.

use core::fmt;

use sd_core::RoutineId;
use serde::{Deserialize, Serialize};

use crate::{SessionError, SessionResult};

/// Run state of a routine. `running` and `paused` are distinct variants, so
/// they can never hold at the same time; `error` only exists on `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RoutineState {
    Idle { error: bool },
    Running,
    Paused,
}

impl Default for RoutineState {
    fn default() -> Self {
        RoutineState::Idle { error: false }
    }
}

impl RoutineState {
    pub fn is_running(self) -> bool {
        matches!(self, RoutineState::Running)
    }

    pub fn is_paused(self) -> bool {
        matches!(self, RoutineState::Paused)
    }

    /// Running or paused: a server-side process exists.
    pub fn is_active(self) -> bool {
        matches!(self, RoutineState::Running | RoutineState::Paused)
    }

    pub fn has_error(self) -> bool {
        matches!(self, RoutineState::Idle { error: true })
    }

    /// CSS-like class name used by renderers.
    pub fn class(self) -> &'static str {
        match self {
            RoutineState::Idle { error: false } => "idle",
            RoutineState::Idle { error: true } => "error",
            RoutineState::Running => "running",
            RoutineState::Paused => "paused",
        }
    }
}

impl fmt::Display for RoutineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class())
    }
}

/// State reported by the server for one routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusChange {
    /// Process started or resumed.
    Running,
    /// Process suspended.
    Paused,
    /// Process finished successfully or was stopped.
    Idle,
    /// Process finished with an error.
    Error,
}

/// Request issued for a routine and not yet acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingRequest {
    Run { resume: bool },
    Pause,
    Stop,
}

/// Inputs to the routine state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleInput {
    /// User clicked run (or resume on a paused routine).
    RunRequested,
    /// User clicked pause; the state only changes on acknowledgement.
    PauseRequested,
    /// User clicked stop; the state only changes on acknowledgement.
    StopRequested,
    /// Server push.
    Pushed(StatusChange),
}

impl LifecycleInput {
    fn verb(self) -> &'static str {
        match self {
            LifecycleInput::RunRequested => "run",
            LifecycleInput::PauseRequested => "pause",
            LifecycleInput::StopRequested => "stop",
            LifecycleInput::Pushed(StatusChange::Running) => "report running",
            LifecycleInput::Pushed(StatusChange::Paused) => "report paused",
            LifecycleInput::Pushed(StatusChange::Idle) => "report idle",
            LifecycleInput::Pushed(StatusChange::Error) => "report error",
        }
    }
}

/// Routine in the routine list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineEntry {
    pub id: RoutineId,
    /// Uploaded file name.
    pub name: String,
    pub state: RoutineState,
    pub pending: Option<PendingRequest>,
}

impl RoutineEntry {
    pub fn new(id: RoutineId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            state: RoutineState::default(),
            pending: None,
        }
    }

    /// Apply one input.
    ///
    /// Every (state, input) pair is listed; illegal pairs leave the entry
    /// untouched and report [`SessionError::IllegalTransition`].
    pub fn apply(&mut self, input: LifecycleInput) -> SessionResult<RoutineState> {
        use LifecycleInput as In;
        use RoutineState as S;

        let (state, pending) = match (self.state, input) {
            (S::Idle { .. }, In::RunRequested) => {
                (S::Running, Some(PendingRequest::Run { resume: false }))
            }
            (S::Paused, In::RunRequested) => (S::Running, Some(PendingRequest::Run { resume: true })),
            (S::Running, In::RunRequested) => return Err(self.illegal(input)),

            (S::Running, In::PauseRequested) => (S::Running, Some(PendingRequest::Pause)),
            (S::Idle { .. } | S::Paused, In::PauseRequested) => return Err(self.illegal(input)),

            (S::Running | S::Paused, In::StopRequested) => (self.state, Some(PendingRequest::Stop)),
            (S::Idle { .. }, In::StopRequested) => return Err(self.illegal(input)),

            (_, In::Pushed(StatusChange::Running)) => (S::Running, None),

            (S::Running | S::Paused, In::Pushed(StatusChange::Paused)) => (S::Paused, None),
            (S::Idle { .. }, In::Pushed(StatusChange::Paused)) => return Err(self.illegal(input)),

            (S::Running | S::Paused, In::Pushed(StatusChange::Idle)) => {
                (S::Idle { error: false }, None)
            }
            // A late stop acknowledgement must not wipe an error marker.
            (S::Idle { error }, In::Pushed(StatusChange::Idle)) => (S::Idle { error }, None),

            (_, In::Pushed(StatusChange::Error)) => (S::Idle { error: true }, None),
        };

        self.state = state;
        self.pending = pending;
        Ok(state)
    }

    fn illegal(&self, input: LifecycleInput) -> SessionError {
        SessionError::IllegalTransition {
            id: self.id.clone(),
            from: self.state,
            input: input.verb(),
        }
    }
}

/// Ordered routine list. Identity is the routine id; names are unique too.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutineList {
    entries: Vec<RoutineEntry>,
}

impl RoutineList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client-side checks run before an upload request is sent.
    pub fn validate_upload(&self, filename: &str) -> SessionResult<()> {
        let filename = filename.trim();
        if filename.is_empty() {
            return Err(SessionError::UploadCancelled);
        }
        if !filename.ends_with(".py") {
            return Err(SessionError::NotAPythonScript(filename.to_string()));
        }
        if self.entries.iter().any(|e| e.name == filename) {
            return Err(SessionError::DuplicateRoutine(filename.to_string()));
        }
        Ok(())
    }

    /// Add an acknowledged upload.
    pub fn add(&mut self, id: RoutineId, name: &str) -> SessionResult<&RoutineEntry> {
        if self.entries.iter().any(|e| e.id == id || e.name == name) {
            return Err(SessionError::DuplicateRoutine(name.to_string()));
        }
        self.entries.push(RoutineEntry::new(id, name));
        self.entries
            .last()
            .ok_or(SessionError::DuplicateRoutine(name.to_string()))
    }

    /// Remove entries, returning the ones that existed.
    pub fn remove(&mut self, ids: &[RoutineId]) -> Vec<RoutineEntry> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| ids.contains(&e.id));
        self.entries = kept;
        removed
    }

    pub fn get(&self, id: &RoutineId) -> Option<&RoutineEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn by_name(&self, name: &str) -> Option<&RoutineEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn contains(&self, id: &RoutineId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoutineEntry> {
        self.entries.iter()
    }

    pub fn ids(&self) -> Vec<RoutineId> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply an input to one routine.
    pub fn apply(&mut self, id: &RoutineId, input: LifecycleInput) -> SessionResult<RoutineState> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| SessionError::UnknownRoutine(id.clone()))?;
        entry.apply(input)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn input() -> impl Strategy<Value = LifecycleInput> {
        prop_oneof![
            Just(LifecycleInput::RunRequested),
            Just(LifecycleInput::PauseRequested),
            Just(LifecycleInput::StopRequested),
            Just(LifecycleInput::Pushed(StatusChange::Running)),
            Just(LifecycleInput::Pushed(StatusChange::Paused)),
            Just(LifecycleInput::Pushed(StatusChange::Idle)),
            Just(LifecycleInput::Pushed(StatusChange::Error)),
        ]
    }

    proptest! {
        #[test]
        fn running_and_paused_never_coexist(inputs in prop::collection::vec(input(), 0..64)) {
            let mut e = RoutineEntry::new(RoutineId::new("r"), "r.py");
            for i in inputs {
                let before = e.clone();
                if e.apply(i).is_err() {
                    prop_assert_eq!(&e, &before);
                }
                prop_assert!(!(e.state.is_running() && e.state.is_paused()));
                if e.state.has_error() {
                    prop_assert!(!e.state.is_active());
                }
            }
        }
    }
}
