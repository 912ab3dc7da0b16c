//! Typed events handled by the dashboard controller.

use std::collections::HashMap;

use sd_core::{PanelId, Point, RoutineId, Size, TreePath};
use sd_layout::TableRow;
use sd_session::{AnalysisOptions, HoverTarget, ShotSelection, StatusChange};
use serde::{Deserialize, Serialize};

/// Anything the controller reacts to. Each event is handled to completion
/// before the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    Ui(UiEvent),
    Server(ServerEvent),
    /// One period of the session timer.
    Tick,
}

impl From<UiEvent> for Event {
    fn from(event: UiEvent) -> Self {
        Event::Ui(event)
    }
}

impl From<ServerEvent> for Event {
    fn from(event: ServerEvent) -> Self {
        Event::Server(event)
    }
}

/// User input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiEvent {
    // file tree
    TreeClicked(TreePath),
    TreeUnselect,
    /// Folder name prompt closed; `None` when cancelled.
    NewFolder(Option<String>),
    RemoveSelectedNode,
    Escape,

    // routine list
    /// File picked for upload; `None` when the picker was cancelled.
    UploadRoutine(Option<String>),
    RoutineClicked(RoutineId),
    RoutineDragStart(RoutineId),
    RoutineDragEnter(RoutineId),
    RoutineDragEnd,
    ToggleSelectAll,
    UnselectRoutines,
    RunSelected,
    PauseSelected,
    StopSelected,
    RemoveSelected,
    FilterChanged(String),

    /// Answer to the pending confirmation dialog.
    Confirm(bool),

    // analysis loop
    StartAnalysis,
    PauseAnalysis,
    StopAnalysis,
    PeriodSliderMoved(f64),
    PeriodTyped(f64),

    // plot list and workspace
    TogglePanel(PanelId),
    ToggleGroup(String),
    HoverEnter(HoverTarget),
    HoverLeave,
    PanelDoubleClicked(PanelId),
    DragStart { id: PanelId, pointer: Point },
    DragMove(Point),
    DragEnd,
    ResizeStart(PanelId),
    Resize { id: PanelId, width: f32 },
    ResizeEnd,
    /// Grid toggle; `rendered` holds where each panel currently is on screen.
    ToggleGrid {
        #[serde(default)]
        rendered: HashMap<PanelId, Point>,
    },
    MoveInFlow { id: PanelId, index: usize },
    RowHeight(f32),
    ViewportResized(Size),

    // analysis options
    SetSelectBy(ShotSelection),
    SetNumShots(u32),
    SetShotsChoice(Vec<String>),
    SetFiletypes(Vec<String>),
    UpdateOptions,
    RevertOptions,
    /// Data directory prompt closed; `None` when cancelled.
    SelectDataDir(Option<String>),
    SetShotsDir(String),
    SetLog(String),

    /// Page is going away.
    Unload,
}

/// Server push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerEvent {
    FolderAdded {
        parent: TreePath,
        name: String,
    },
    FileAdded {
        parent: TreePath,
        name: String,
        routine: bool,
    },
    NodeRemoved {
        path: TreePath,
    },
    RoutineUploaded {
        id: RoutineId,
        name: String,
    },
    RoutinesRemoved {
        ids: Vec<RoutineId>,
    },
    RoutineStatusChanged {
        id: RoutineId,
        status: StatusChange,
    },
    RoutineGroupCreated {
        routine: String,
    },
    PlotCreated {
        routine: String,
        panel: PanelId,
        url: String,
        size: Size,
    },
    PanelImageReady {
        panel: PanelId,
        url: String,
        size: Size,
    },
    TableReady {
        routine: String,
        panel: PanelId,
        caption: String,
        rows: Vec<TableRow>,
        #[serde(default)]
        size: Option<Size>,
    },
    RoutineInfo {
        routine: String,
        options: AnalysisOptions,
    },
    StatusMessage(String),
    AnalysisStarted,
    AnalysisPaused,
    AnalysisStopped,
    PeriodWarning,
    LogPathChanged(String),
}

/// Destructive action waiting for the user's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confirmation {
    RemoveFolder { path: TreePath },
    RemoveFile { path: TreePath, is_routine: bool },
    RemoveRoutines { ids: Vec<RoutineId>, names: Vec<String> },
}

impl Confirmation {
    pub fn message(&self) -> String {
        match self {
            Confirmation::RemoveFolder { path } => format!(
                "Are you sure you want to remove {}? This will remove all sub-directories and sub-routines.",
                path.name().unwrap_or_default()
            ),
            Confirmation::RemoveFile { path, .. } => format!(
                "Are you sure you want to remove {}?",
                path.name().unwrap_or_default()
            ),
            Confirmation::RemoveRoutines { names, .. } => {
                format!("Are you sure you want to remove {}?", names.join(", "))
            }
        }
    }
}
