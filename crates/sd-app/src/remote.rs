//! Boundary to the server: outbound actions and the channel they travel on.
//!
//! The channel is opaque. A request is fire-and-forget; a subscription opens a
//! longer exchange whose results come back later as
//! [`ServerEvent`](crate::events::ServerEvent)s.

use sd_core::{PanelId, RoutineId, TreePath};
use sd_session::{AnalysisOptions, ShotSelection};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// How an action is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Request,
    Subscribe,
}

/// Panel the server should keep when an analysis resumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub id: PanelId,
    /// File name of the routine that owns the panel.
    pub file: String,
}

/// Outbound action vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    AddFolder {
        path: TreePath,
        name: String,
    },
    RemoveFolder {
        path: TreePath,
    },
    RemoveFile {
        name: String,
        is_routine: bool,
    },
    /// Upload a routine file.
    AddRoutine {
        filename: String,
    },
    Analyse {
        paused: bool,
        period: f64,
        panels: Vec<PanelSpec>,
    },
    PauseAnalysis,
    StopAnalysis,
    RunRoutine {
        id: RoutineId,
        resume: bool,
    },
    StopRoutine {
        ids: Vec<RoutineId>,
    },
    PauseRoutine {
        ids: Vec<RoutineId>,
    },
    RemoveRoutine {
        ids: Vec<RoutineId>,
    },
    SelectDataDir {
        path: String,
        apply_to_routine: bool,
        routine: String,
    },
    SetShotsDir {
        routine: String,
        shots_dir: String,
    },
    SetAnalysisOptions {
        routine: String,
        options: AnalysisOptions,
    },
    SetAnalysisType {
        routine: String,
        select_by: ShotSelection,
    },
    SetLog {
        path: String,
    },
    DisplayRoutineInfo {
        routine: String,
    },
    RefreshAnalysis {
        routine: String,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddFolder { .. } => "add_folder",
            Action::RemoveFolder { .. } => "remove_folder",
            Action::RemoveFile { .. } => "remove_file",
            Action::AddRoutine { .. } => "add_routine",
            Action::Analyse { .. } => "analyse",
            Action::PauseAnalysis => "pause_analysis",
            Action::StopAnalysis => "stop_analysis",
            Action::RunRoutine { .. } => "run_routine",
            Action::StopRoutine { .. } => "stop_routine",
            Action::PauseRoutine { .. } => "pause_routine",
            Action::RemoveRoutine { .. } => "remove_routine",
            Action::SelectDataDir { .. } => "select_data_dir",
            Action::SetShotsDir { .. } => "set_shots_dir",
            Action::SetAnalysisOptions { .. } => "set_analysis_options",
            Action::SetAnalysisType { .. } => "set_analysis_type",
            Action::SetLog { .. } => "set_log",
            Action::DisplayRoutineInfo { .. } => "display_routine_info",
            Action::RefreshAnalysis { .. } => "refresh_analysis",
        }
    }

    /// Streaming actions open a subscription; everything else is a request.
    pub fn kind(&self) -> CallKind {
        match self {
            Action::Analyse { .. } | Action::RunRoutine { .. } => CallKind::Subscribe,
            _ => CallKind::Request,
        }
    }

    /// Positional arguments in wire order.
    pub fn args(&self) -> Vec<Value> {
        match self {
            Action::AddFolder { path, name } => vec![json!(path.to_string()), json!(name)],
            Action::RemoveFolder { path } => vec![json!(path.to_string())],
            Action::RemoveFile { name, is_routine } => vec![json!(name), json!(is_routine)],
            Action::AddRoutine { filename } => vec![json!(filename)],
            Action::Analyse {
                paused,
                period,
                panels,
            } => vec![json!(paused), json!(period), json!(panels)],
            Action::PauseAnalysis | Action::StopAnalysis => Vec::new(),
            Action::RunRoutine { id, resume } => vec![json!(id), json!(resume)],
            Action::StopRoutine { ids }
            | Action::PauseRoutine { ids }
            | Action::RemoveRoutine { ids } => vec![json!(ids)],
            Action::SelectDataDir {
                path,
                apply_to_routine,
                routine,
            } => vec![json!(path), json!(apply_to_routine), json!(routine)],
            Action::SetShotsDir { routine, shots_dir } => vec![json!(routine), json!(shots_dir)],
            Action::SetAnalysisOptions { routine, options } => {
                vec![json!(routine), json!(options)]
            }
            Action::SetAnalysisType { routine, select_by } => {
                vec![json!(routine), json!(select_by)]
            }
            Action::SetLog { path } => vec![json!(path)],
            Action::DisplayRoutineInfo { routine } | Action::RefreshAnalysis { routine } => {
                vec![json!(routine)]
            }
        }
    }
}

/// Transport to the server. Both primitives return immediately.
pub trait RemoteChannel {
    fn request(&mut self, action: &str, args: Vec<Value>);

    fn subscribe(&mut self, action: &str, args: Vec<Value>);

    fn send(&mut self, action: &Action) {
        match action.kind() {
            CallKind::Request => self.request(action.name(), action.args()),
            CallKind::Subscribe => self.subscribe(action.name(), action.args()),
        }
    }
}

/// One captured outbound call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelCall {
    pub kind: CallKind,
    pub action: String,
    pub args: Vec<Value>,
}

/// Channel that records every call in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingChannel {
    pub calls: Vec<ChannelCall>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Action names in call order.
    pub fn names(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.action.as_str()).collect()
    }

    /// Index of the first call named `action`.
    pub fn position(&self, action: &str) -> Option<usize> {
        self.calls.iter().position(|c| c.action == action)
    }

    pub fn take(&mut self) -> Vec<ChannelCall> {
        std::mem::take(&mut self.calls)
    }
}

impl RemoteChannel for RecordingChannel {
    fn request(&mut self, action: &str, args: Vec<Value>) {
        self.calls.push(ChannelCall {
            kind: CallKind::Request,
            action: action.to_string(),
            args,
        });
    }

    fn subscribe(&mut self, action: &str, args: Vec<Value>) {
        self.calls.push(ChannelCall {
            kind: CallKind::Subscribe,
            action: action.to_string(),
            args,
        });
    }
}
