//! sd-layout: panel sizing and arrangement for the plot workspace.
//!
//! - scale: aspect-preserving fits against a bounding box
//! - panel: runtime representation of a plot or table container
//! - workspace: panel collection, free-form vs grid arrangement
//! - row_height: the uniform row height slider

pub mod panel;
pub mod row_height;
pub mod scale;
pub mod workspace;

pub use panel::{Panel, PanelKind, TableRow};
pub use row_height::RowHeightSlider;
pub use scale::{fit_with_factor, fit_within, scale_factor};
pub use workspace::{LayoutConfig, LayoutMode, Workspace};

use sd_core::PanelId;

pub type LayoutResult<T> = Result<T, LayoutError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Panel size must be positive, got {width}x{height}")]
    DegenerateSize { width: f32, height: f32 },

    #[error("Panel not found: {0}")]
    PanelNotFound(PanelId),

    #[error("Panel already exists: {0}")]
    DuplicatePanel(PanelId),

    #[error("Panels cannot be dragged while grid mode is on")]
    GridLocked,

    #[error("Panels can only be reordered in grid mode")]
    GridRequired,
}
