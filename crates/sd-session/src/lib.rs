//! sd-session: client-side state of a dashboard session.
//!
//! Every model here is plain data mutated by the controller's event handlers:
//! - file_tree: single-selection routine file tree
//! - lifecycle: routine entries and their run state machine
//! - selection: multi-selection of routine entries + derived button state
//! - visibility: panel / routine-group visibility and hover highlights
//! - filter: routine list filter
//! - options: analysis options draft of the selected routine
//! - analysis: analysis loop controls and the period slider

pub mod analysis;
pub mod file_tree;
pub mod filter;
pub mod lifecycle;
pub mod options;
pub mod selection;
pub mod visibility;

pub use analysis::{AnalysisButtons, AnalysisControl, AnalysisPhase, PeriodSlider};
pub use file_tree::{FileTree, NodeKind, TreeButtons, TreeNode, TreeRow};
pub use filter::{RoutineFilter, StateKeyword};
pub use lifecycle::{
    LifecycleInput, PendingRequest, RoutineEntry, RoutineList, RoutineState, StatusChange,
};
pub use options::{AnalysisOptions, OptionsEditor, OptionsLayout, ShotSelection};
pub use selection::{ControlButtons, RoutineSelection, SelectAllScope};
pub use visibility::{GroupRow, HoverTarget, ItemRow, VisibilityModel};

use sd_core::{CoreError, PanelId, RoutineId, TreePath};

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("No {what} given")]
    EmptyName { what: &'static str },

    #[error("Nothing selected")]
    NothingSelected,

    #[error("No routine selected")]
    NoRoutineSelected,

    #[error("Path not found: '{0}'")]
    UnknownPath(TreePath),

    #[error("'{0}' is not a folder")]
    NotAFolder(TreePath),

    #[error("'{0}' already exists")]
    DuplicateNode(TreePath),

    #[error("Routine not found: {0}")]
    UnknownRoutine(RoutineId),

    #[error("A routine with the name '{0}' already exists.")]
    DuplicateRoutine(String),

    #[error("Upload cancelled.")]
    UploadCancelled,

    #[error("'{0}' is not a Python script.")]
    NotAPythonScript(String),

    #[error("Routine {id} cannot {input} while {from}")]
    IllegalTransition {
        id: RoutineId,
        from: RoutineState,
        input: &'static str,
    },

    #[error("Analysis cannot {action} while {phase}")]
    AnalysisPhase {
        action: &'static str,
        phase: AnalysisPhase,
    },

    #[error("Panel not found: {0}")]
    UnknownPanel(PanelId),

    #[error("Routine group not found: '{0}'")]
    UnknownGroup(String),

    #[error("At most {limit} shots can be chosen")]
    ChoiceLimit { limit: u32 },

    #[error(transparent)]
    Core(#[from] CoreError),
}
