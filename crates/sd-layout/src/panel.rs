//! Runtime representation of a workspace panel.

use sd_core::{PanelId, Point, Size};
use serde::{Deserialize, Serialize};

/// One `name: value` row of a data table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub name: String,
    pub value: String,
}

/// What a panel renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PanelKind {
    /// Image plot; `url` is the last image the server rendered.
    Plot { url: String },
    /// Tabular result attached to a plot.
    Table { caption: String, rows: Vec<TableRow> },
}

/// A plot or table container in the workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub id: PanelId,
    /// File name of the routine that emitted the panel.
    pub routine: String,
    pub kind: PanelKind,
    /// Intrinsic size (image pixels for plots).
    pub natural: Size,
    /// Current rendered size.
    pub size: Size,
    /// Absolute position; `None` while the workspace is in grid mode.
    pub position: Option<Point>,
    /// Position held before grid mode stripped it.
    pub recorded_position: Option<Point>,
}

impl Panel {
    pub fn is_plot(&self) -> bool {
        matches!(self.kind, PanelKind::Plot { .. })
    }

    pub fn image_url(&self) -> Option<&str> {
        match &self.kind {
            PanelKind::Plot { url } => Some(url),
            PanelKind::Table { .. } => None,
        }
    }

    /// Current scale relative to the intrinsic size.
    pub fn scale(&self) -> f32 {
        if self.natural.width > 0.0 {
            self.size.width / self.natural.width
        } else {
            1.0
        }
    }
}
