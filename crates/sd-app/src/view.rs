//! Render snapshot. Front ends draw from this and never read model state
//! directly.

use sd_core::{PanelId, Point, RoutineId, Size};
use sd_layout::{LayoutMode, PanelKind};
use sd_session::{
    AnalysisButtons, AnalysisOptions, AnalysisPhase, ControlButtons, GroupRow, OptionsLayout,
    RoutineState, TreeButtons, TreeRow,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutineRow {
    pub id: RoutineId,
    pub name: String,
    pub state: RoutineState,
    /// Class name for styling: idle, error, running, paused.
    pub class: &'static str,
    pub selected: bool,
    /// Passes the current filter.
    pub shown: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelView {
    pub id: PanelId,
    pub routine: String,
    pub kind: PanelKind,
    pub size: Size,
    /// Absolute position in free mode, flow position in grid mode.
    pub position: Point,
    pub visible: bool,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionsView {
    pub routine: String,
    pub options: AnalysisOptions,
    pub layout: OptionsLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisView {
    pub phase: AnalysisPhase,
    pub buttons: AnalysisButtons,
    pub period_value: f64,
    pub period_min: f64,
    pub period_max: f64,
    pub period_display: String,
    pub elapsed: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowHeightView {
    pub value: f32,
    pub min: f32,
    pub max: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub tree: Vec<TreeRow>,
    pub path_field: String,
    pub tree_buttons: TreeButtons,
    pub routine_info_visible: bool,
    pub routines: Vec<RoutineRow>,
    pub routine_buttons: ControlButtons,
    pub filter: String,
    pub analysis: AnalysisView,
    pub plot_list: Vec<GroupRow>,
    /// Stacking order, last is front-most.
    pub panels: Vec<PanelView>,
    pub layout_mode: LayoutMode,
    pub row_height: RowHeightView,
    pub options: Option<OptionsView>,
    pub status: Vec<String>,
    pub confirmation: Option<String>,
    pub log_path: Option<String>,
}
