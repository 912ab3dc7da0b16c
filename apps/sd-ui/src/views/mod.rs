pub mod analysis_view;
pub mod options_view;
pub mod routine_view;
pub mod status_view;
pub mod tree_view;
pub mod workspace_view;

pub use analysis_view::AnalysisBar;
pub use options_view::OptionsView;
pub use routine_view::RoutineView;
pub use status_view::StatusView;
pub use tree_view::TreeView;
pub use workspace_view::{PlotListView, WorkspaceView};

use sd_app::UiEvent;

/// Native file dialog a view asked the app to open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DialogRequest {
    UploadRoutine,
    DataDirectory,
    LogFile,
}

/// What the views produced during one frame.
#[derive(Debug, Default)]
pub struct Actions {
    pub events: Vec<UiEvent>,
    pub dialog: Option<DialogRequest>,
}

impl Actions {
    pub fn push(&mut self, event: UiEvent) {
        self.events.push(event);
    }
}
