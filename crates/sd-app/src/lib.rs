//! Shared application layer for the routine dashboard.
//!
//! Both the CLI and the desktop front end drive the same controller; it owns
//! every session model and talks to the server through a [`RemoteChannel`].
//!
//! Contains:
//! - config (dashboard configuration file)
//! - controller (event dispatch over every session model)
//! - events (UI input and server pushes)
//! - remote (outbound actions and the channel boundary)
//! - status (timestamped status log)
//! - view (render snapshot consumed by front ends)
//! - error (application error types)

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod remote;
pub mod status;
pub mod view;

pub use config::{AnalysisConfig, DashboardConfig, SelectionPolicy, load_yaml, save_yaml};
pub use controller::DashboardController;
pub use error::{AppError, AppResult};
pub use events::{Confirmation, Event, ServerEvent, UiEvent};
pub use remote::{Action, CallKind, ChannelCall, PanelSpec, RecordingChannel, RemoteChannel};
pub use status::{StatusLine, StatusLog};
pub use view::{AnalysisView, DashboardView, OptionsView, PanelView, RoutineRow, RowHeightView};
