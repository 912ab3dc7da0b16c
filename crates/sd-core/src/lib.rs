//! sd-core: stable foundation for the routine dashboard.
//!
//! Contains:
//! - ids (routine, panel and file-tree identities)
//! - geometry (panel sizes and positions)
//! - numeric (tolerances + float helpers)
//! - time_format (elapsed-time strings)
//! - timer (the session timer driven by the UI tick)
//! - error (shared error types)

pub mod error;
pub mod geometry;
pub mod ids;
pub mod numeric;
pub mod time_format;
pub mod timer;

pub use error::{CoreError, CoreResult};
pub use geometry::{Point, Size};
pub use ids::{PanelId, RoutineId, TreePath};
pub use numeric::{Tolerances, nearly_equal};
pub use time_format::format_elapsed;
pub use timer::SessionTimer;
