//! Dashboard controller: owns every session model and dispatches events.
//!
//! Handlers run to completion one at a time. Each one mutates the models,
//! issues outbound calls in order, and finally recomputes the derived button
//! state. Validation failures are reported on the status log and never reach
//! the channel.

use std::collections::HashMap;
use std::time::Instant;

use sd_core::{PanelId, Point, RoutineId, SessionTimer};
use sd_layout::{LayoutError, Workspace};
use sd_session::{
    AnalysisControl, ControlButtons, FileTree, LifecycleInput, NodeKind, OptionsEditor,
    PeriodSlider, RoutineFilter, RoutineList, RoutineSelection, SelectAllScope, SessionError,
    StatusChange, VisibilityModel,
};

use crate::config::DashboardConfig;
use crate::events::{Confirmation, Event, ServerEvent, UiEvent};
use crate::remote::{Action, PanelSpec, RemoteChannel};
use crate::status::StatusLog;
use crate::view::{AnalysisView, DashboardView, OptionsView, PanelView, RoutineRow, RowHeightView};
use crate::AppResult;

/// More removed routines than this are summarised by count.
const REMOVAL_LIST_LIMIT: usize = 3;

pub struct DashboardController<C: RemoteChannel> {
    config: DashboardConfig,
    channel: C,
    tree: FileTree,
    routines: RoutineList,
    selection: RoutineSelection,
    filter: RoutineFilter,
    filter_text: String,
    visibility: VisibilityModel,
    workspace: Workspace,
    options: OptionsEditor,
    analysis: AnalysisControl,
    timer: SessionTimer,
    status: StatusLog,
    buttons: ControlButtons,
    confirmation: Option<Confirmation>,
    routine_info_visible: bool,
}

impl<C: RemoteChannel> DashboardController<C> {
    pub fn new(config: DashboardConfig, channel: C) -> Self {
        Self {
            channel,
            tree: FileTree::new(),
            routines: RoutineList::new(),
            selection: RoutineSelection::new(),
            filter: RoutineFilter::All,
            filter_text: String::new(),
            visibility: VisibilityModel::new(),
            workspace: Workspace::new(config.layout),
            options: OptionsEditor::new(),
            analysis: AnalysisControl::new(config.analysis.slider().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "unusable analysis defaults, using built-in slider");
                PeriodSlider::default()
            })),
            timer: SessionTimer::new(config.timer_tick()),
            status: StatusLog::with_capacity(config.status_capacity),
            buttons: ControlButtons::default(),
            confirmation: None,
            routine_info_visible: false,
            config,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn routines(&self) -> &RoutineList {
        &self.routines
    }

    pub fn selection(&self) -> &RoutineSelection {
        &self.selection
    }

    pub fn visibility(&self) -> &VisibilityModel {
        &self.visibility
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn options(&self) -> &OptionsEditor {
        &self.options
    }

    pub fn analysis(&self) -> &AnalysisControl {
        &self.analysis
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn status(&self) -> &StatusLog {
        &self.status
    }

    /// Routine control buttons as of the end of the last handler.
    pub fn buttons(&self) -> ControlButtons {
        self.buttons
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        self.confirmation.as_ref()
    }

    pub fn routine_info_visible(&self) -> bool {
        self.routine_info_visible
    }

    /// Handle one event to completion.
    ///
    /// A rejected event leaves a status line and returns the error; derived
    /// state is recomputed either way.
    pub fn dispatch(&mut self, event: impl Into<Event>) -> AppResult<()> {
        let event = event.into();
        if event != Event::Tick {
            tracing::debug!(?event, "dispatch");
        }
        let result = match event {
            Event::Ui(event) => self.handle_ui(event),
            Event::Server(event) => self.handle_server(event),
            Event::Tick => {
                self.tick();
                Ok(())
            }
        };
        if let Err(err) = &result {
            tracing::warn!(error = %err, "event rejected");
            self.status.push(err.to_string());
        }
        self.refresh();
        result
    }

    /// Advance the session timer to wall time `now`. Used by front ends that
    /// poll once per frame instead of delivering ticks.
    pub fn catch_up(&mut self, now: Instant) -> u64 {
        self.timer.catch_up(now)
    }

    fn tick(&mut self) {
        if let Some(handle) = self.timer.handle() {
            self.timer.tick(handle);
        }
    }

    fn send(&mut self, action: Action) {
        tracing::info!(action = action.name(), kind = ?action.kind(), "outbound");
        self.channel.send(&action);
    }

    fn refresh(&mut self) {
        let universe = self.select_all_universe();
        self.buttons = ControlButtons::derive(&self.selection, &self.routines, &universe);
        let visible = self.visibility.visible_panels();
        self.workspace.sync_row_height(|id| visible.contains(id));
    }

    fn select_all_universe(&self) -> Vec<RoutineId> {
        match self.config.selection.select_all_scope {
            SelectAllScope::Total => self.routines.ids(),
            SelectAllScope::Visible => self
                .routines
                .iter()
                .filter(|e| self.filter.matches(e))
                .map(|e| e.id.clone())
                .collect(),
        }
    }

    fn handle_ui(&mut self, event: UiEvent) -> AppResult<()> {
        match event {
            UiEvent::TreeClicked(path) => {
                let previous = self.tree.selected_routine().map(str::to_string);
                self.tree.select(&path)?;
                match self.tree.selected_routine().map(str::to_string) {
                    Some(name) => {
                        self.routine_info_visible = true;
                        if previous.as_deref() != Some(name.as_str()) {
                            self.options.select_routine(Some(&name));
                            self.send(Action::DisplayRoutineInfo { routine: name });
                        }
                    }
                    None => self.hide_routine_info(),
                }
            }
            UiEvent::TreeUnselect => {
                self.tree.unselect();
                self.hide_routine_info();
            }
            UiEvent::Escape => {
                self.tree.unselect();
                self.hide_routine_info();
                self.selection.clear();
            }
            UiEvent::NewFolder(name) => {
                let name = name.unwrap_or_default();
                let path = self.tree.validate_new_folder(&name)?;
                self.send(Action::AddFolder {
                    path: path.parent().unwrap_or_default(),
                    name: name.trim().to_string(),
                });
            }
            UiEvent::RemoveSelectedNode => {
                let node = self
                    .tree
                    .selected_node()
                    .ok_or(SessionError::NothingSelected)?;
                let confirmation = match node.kind {
                    NodeKind::Folder => Confirmation::RemoveFolder {
                        path: node.path.clone(),
                    },
                    kind => Confirmation::RemoveFile {
                        path: node.path.clone(),
                        is_routine: kind == NodeKind::Routine,
                    },
                };
                self.request_confirmation(confirmation)?;
            }

            UiEvent::UploadRoutine(filename) => {
                let filename = filename.unwrap_or_default();
                self.routines.validate_upload(&filename)?;
                self.send(Action::AddRoutine {
                    filename: filename.trim().to_string(),
                });
            }
            UiEvent::RoutineClicked(id) => {
                self.ensure_listed(&id)?;
                self.selection.toggle(&id);
            }
            UiEvent::RoutineDragStart(id) => {
                self.ensure_listed(&id)?;
                self.selection.begin_drag(&id);
            }
            UiEvent::RoutineDragEnter(id) => {
                if self.routines.contains(&id) {
                    self.selection.drag_enter(&id);
                }
            }
            UiEvent::RoutineDragEnd => self.selection.end_drag(),
            UiEvent::ToggleSelectAll => {
                let universe = self.select_all_universe();
                self.selection.toggle_all(&universe);
            }
            UiEvent::UnselectRoutines => self.selection.clear(),
            UiEvent::RunSelected => self.run_selected()?,
            UiEvent::PauseSelected => self.pause_selected()?,
            UiEvent::StopSelected => self.stop_selected()?,
            UiEvent::RemoveSelected => {
                let ids = self.selected_ids()?;
                let names = ids
                    .iter()
                    .filter_map(|id| self.routines.get(id))
                    .map(|e| e.name.clone())
                    .collect();
                self.request_confirmation(Confirmation::RemoveRoutines { ids, names })?;
            }
            UiEvent::FilterChanged(text) => {
                self.filter = RoutineFilter::parse(&text);
                self.filter_text = text;
                if self.config.selection.filter_clears_selection {
                    self.selection.clear();
                }
            }

            UiEvent::Confirm(accepted) => {
                if let Some(confirmation) = self.confirmation.take() {
                    if accepted {
                        self.execute(confirmation);
                    }
                }
            }

            UiEvent::StartAnalysis => {
                let resume = self.analysis.start()?;
                let panels = if resume {
                    self.workspace
                        .ordered_panels()
                        .map(|p| PanelSpec {
                            id: p.id.clone(),
                            file: p.routine.clone(),
                        })
                        .collect()
                } else {
                    Vec::new()
                };
                let period = self.analysis.slider.period();
                self.send(Action::Analyse {
                    paused: resume,
                    period,
                    panels,
                });
            }
            UiEvent::PauseAnalysis => {
                self.analysis.pause()?;
                self.send(Action::PauseAnalysis);
            }
            UiEvent::StopAnalysis => {
                self.analysis.stop()?;
                self.send(Action::StopAnalysis);
            }
            UiEvent::PeriodSliderMoved(value) => {
                self.ensure_period_editable()?;
                self.analysis.slider.set_value(value)?;
            }
            UiEvent::PeriodTyped(period) => {
                self.ensure_period_editable()?;
                self.analysis.slider.set_period(period)?;
            }

            UiEvent::TogglePanel(id) => {
                if self.visibility.toggle_panel(&id)? {
                    self.workspace.bring_to_front(&id);
                }
            }
            UiEvent::ToggleGroup(name) => {
                self.visibility.toggle_group(&name)?;
            }
            UiEvent::HoverEnter(target) => self.visibility.hover_enter(&target),
            UiEvent::HoverLeave => self.visibility.hover_leave(),
            UiEvent::PanelDoubleClicked(id) => {
                if !self.workspace.bring_to_front(&id) {
                    return Err(LayoutError::PanelNotFound(id).into());
                }
            }
            UiEvent::DragStart { id, pointer } => {
                self.workspace.start_drag(&id, pointer)?;
                self.workspace.bring_to_front(&id);
            }
            UiEvent::DragMove(pointer) => self.workspace.drag_to(pointer)?,
            UiEvent::DragEnd => self.workspace.stop_drag(),
            UiEvent::ResizeStart(id) => {
                if !self.workspace.start_resize(&id) {
                    return Err(LayoutError::PanelNotFound(id).into());
                }
            }
            UiEvent::Resize { id, width } => {
                self.workspace.resize_panel(&id, width)?;
            }
            UiEvent::ResizeEnd => self.workspace.stop_resize(),
            UiEvent::ToggleGrid { rendered } => {
                if self.workspace.is_grid() {
                    let visible = self.visibility.visible_panels();
                    let width = self.workspace.config.viewport.width;
                    self.workspace
                        .exit_grid_in_flow(width, |id| visible.contains(id), &rendered);
                } else {
                    self.workspace.enter_grid();
                }
            }
            UiEvent::MoveInFlow { id, index } => self.workspace.move_in_flow(&id, index)?,
            UiEvent::RowHeight(height) => {
                let visible = self.visibility.visible_panels();
                self.workspace
                    .apply_row_height(height, |id| visible.contains(id));
            }
            UiEvent::ViewportResized(size) => {
                self.workspace.set_viewport(size);
            }

            UiEvent::SetSelectBy(method) => self.options.set_select_by(method)?,
            UiEvent::SetNumShots(n) => self.options.set_num_shots(n)?,
            UiEvent::SetShotsChoice(shots) => self.options.set_shots_choice(shots)?,
            UiEvent::SetFiletypes(filetypes) => self.options.set_filetypes(filetypes)?,
            UiEvent::UpdateOptions => {
                if let Some((routine, options)) = self.options.flush()? {
                    self.send(Action::SetAnalysisType {
                        routine: routine.clone(),
                        select_by: options.select_by,
                    });
                    self.send(Action::SetAnalysisOptions { routine, options });
                }
            }
            UiEvent::RevertOptions => {
                if let Some(routine) = self.options.revert() {
                    self.send(Action::RefreshAnalysis { routine });
                }
            }
            UiEvent::SelectDataDir(path) => {
                let path = path
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .ok_or(SessionError::EmptyName {
                        what: "data directory",
                    })?;
                let routine = self.tree.selected_routine().map(str::to_string);
                self.send(Action::SelectDataDir {
                    path,
                    apply_to_routine: routine.is_some(),
                    routine: routine.unwrap_or_default(),
                });
            }
            UiEvent::SetShotsDir(shots_dir) => {
                let routine = self
                    .tree
                    .selected_routine()
                    .map(str::to_string)
                    .ok_or(SessionError::NoRoutineSelected)?;
                self.send(Action::SetShotsDir { routine, shots_dir });
            }
            UiEvent::SetLog(path) => self.send(Action::SetLog {
                path: path.trim().to_string(),
            }),

            UiEvent::Unload => self.unload(),
        }
        Ok(())
    }

    fn handle_server(&mut self, event: ServerEvent) -> AppResult<()> {
        match event {
            ServerEvent::FolderAdded { parent, name } => {
                self.tree.add_folder(&parent, &name)?;
                self.status
                    .push(format!("Folder '{name}' added successfully"));
            }
            ServerEvent::FileAdded {
                parent,
                name,
                routine,
            } => {
                self.tree.add_file(&parent, &name, routine)?;
                self.status.push(format!("'{name}' added successfully"));
            }
            ServerEvent::NodeRemoved { path } => {
                let node = self.tree.remove(&path)?;
                let message = if node.is_folder() {
                    format!("Folder '{}' removed successfully", node.name())
                } else {
                    format!("'{}' removed successfully", node.name())
                };
                self.status.push(message);
                if self.tree.selected().is_none() {
                    self.hide_routine_info();
                }
            }
            ServerEvent::RoutineUploaded { id, name } => {
                self.routines.add(id, &name)?;
                self.status.push(format!("'{name}' uploaded successfully"));
            }
            ServerEvent::RoutinesRemoved { ids } => {
                let removed = self.routines.remove(&ids);
                self.selection.prune(&self.routines);
                for entry in &removed {
                    self.drop_routine_panels(&entry.name);
                }
            }
            ServerEvent::RoutineStatusChanged { id, status } => {
                self.apply_status(&id, status)?;
            }
            ServerEvent::RoutineGroupCreated { routine } => {
                self.visibility.add_group(&routine);
            }
            ServerEvent::PlotCreated {
                routine,
                panel,
                url,
                size,
            } => {
                self.workspace.add_plot(panel.clone(), &routine, url, size)?;
                self.visibility
                    .add_panel(&routine, panel, self.config.panels_start_visible);
            }
            ServerEvent::PanelImageReady { panel, url, size } => {
                if !self.workspace.contains(&panel) {
                    tracing::warn!(%panel, "image for unknown panel ignored");
                    return Ok(());
                }
                self.workspace.update_plot_image(&panel, url, size)?;
            }
            ServerEvent::TableReady {
                routine,
                panel,
                caption,
                rows,
                size,
            } => {
                if self.workspace.contains(&panel) {
                    self.workspace.update_table(&panel, caption, rows)?;
                } else {
                    self.workspace
                        .add_table(panel.clone(), &routine, caption, rows, size)?;
                    self.visibility
                        .add_panel(&routine, panel, self.config.panels_start_visible);
                }
            }
            ServerEvent::RoutineInfo { routine, options } => {
                if self.tree.selected_routine() == Some(routine.as_str()) {
                    self.options.load(&routine, options);
                } else {
                    tracing::debug!(%routine, "routine info for unselected routine ignored");
                }
            }
            ServerEvent::StatusMessage(text) => self.status.push(text),
            ServerEvent::AnalysisStarted => {
                if self.analysis.acknowledge_start() {
                    self.workspace.clear();
                    self.visibility.clear();
                    self.timer.reset();
                }
                self.timer.start(Instant::now());
            }
            ServerEvent::AnalysisPaused => {
                self.timer.stop();
            }
            ServerEvent::AnalysisStopped => {
                self.timer.reset();
                self.analysis.acknowledge_stop();
            }
            ServerEvent::PeriodWarning => {
                if self.analysis.warn_period() {
                    self.status.push(
                        "Warning: the analysis period is shorter than the time the routines take to run.",
                    );
                }
            }
            ServerEvent::LogPathChanged(path) => {
                if path.trim().is_empty() {
                    self.status.set_path(None);
                    self.status.push("Logging stopped.");
                } else {
                    self.status.set_path(Some(path.trim().into()));
                    self.status.push(format!("Logging to '{}'", path.trim()));
                }
            }
        }
        Ok(())
    }

    fn apply_status(&mut self, id: &RoutineId, status: StatusChange) -> AppResult<()> {
        if !self.routines.contains(id) {
            tracing::warn!(%id, ?status, "status push for unknown routine ignored");
            return Ok(());
        }
        match self.routines.apply(id, LifecycleInput::Pushed(status)) {
            Ok(state) => {
                tracing::debug!(%id, %state, "routine state");
                Ok(())
            }
            Err(err @ SessionError::IllegalTransition { .. }) => {
                tracing::warn!(error = %err, "status push ignored");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn ensure_listed(&self, id: &RoutineId) -> AppResult<()> {
        if self.routines.contains(id) {
            Ok(())
        } else {
            Err(SessionError::UnknownRoutine(id.clone()).into())
        }
    }

    fn ensure_period_editable(&self) -> AppResult<()> {
        if self.analysis.buttons().slider_enabled {
            Ok(())
        } else {
            Err(SessionError::AnalysisPhase {
                action: "change the period",
                phase: self.analysis.phase(),
            }
            .into())
        }
    }

    /// Selected ids in list order; an empty selection is a validation error.
    fn selected_ids(&self) -> AppResult<Vec<RoutineId>> {
        let ids = self.selection.ordered(&self.routines);
        if ids.is_empty() {
            return Err(SessionError::NoRoutineSelected.into());
        }
        Ok(ids)
    }

    fn run_selected(&mut self) -> AppResult<()> {
        for id in self.selected_ids()? {
            let Some(entry) = self.routines.get(&id) else {
                continue;
            };
            if entry.state.is_running() {
                continue;
            }
            let resume = entry.state.is_paused();
            self.routines.apply(&id, LifecycleInput::RunRequested)?;
            self.send(Action::RunRoutine { id, resume });
        }
        Ok(())
    }

    fn pause_selected(&mut self) -> AppResult<()> {
        let ids: Vec<RoutineId> = self
            .selected_ids()?
            .into_iter()
            .filter(|id| self.routines.get(id).is_some_and(|e| e.state.is_running()))
            .collect();
        if ids.is_empty() {
            return Ok(());
        }
        for id in &ids {
            self.routines.apply(id, LifecycleInput::PauseRequested)?;
        }
        self.send(Action::PauseRoutine { ids });
        Ok(())
    }

    fn stop_selected(&mut self) -> AppResult<()> {
        let ids = self.active_among(&self.selected_ids()?);
        if ids.is_empty() {
            return Ok(());
        }
        for id in &ids {
            self.routines.apply(id, LifecycleInput::StopRequested)?;
        }
        self.send(Action::StopRoutine { ids });
        Ok(())
    }

    fn active_among(&self, ids: &[RoutineId]) -> Vec<RoutineId> {
        ids.iter()
            .filter(|id| self.routines.get(id).is_some_and(|e| e.state.is_active()))
            .cloned()
            .collect()
    }

    fn request_confirmation(&mut self, confirmation: Confirmation) -> AppResult<()> {
        if self.config.confirm_destructive {
            self.confirmation = Some(confirmation);
        } else {
            self.execute(confirmation);
        }
        Ok(())
    }

    fn execute(&mut self, confirmation: Confirmation) {
        match confirmation {
            Confirmation::RemoveFolder { path } => {
                self.send(Action::RemoveFolder { path });
            }
            Confirmation::RemoveFile { path, is_routine } => {
                let name = path.name().unwrap_or_default().to_string();
                self.send(Action::RemoveFile { name, is_routine });
                self.hide_routine_info();
            }
            Confirmation::RemoveRoutines { ids, .. } => self.remove_routines(ids),
        }
    }

    /// Stop whatever is still active, then remove. The entries go away
    /// locally right away; late pushes for them are ignored.
    fn remove_routines(&mut self, ids: Vec<RoutineId>) {
        let active = self.active_among(&ids);
        if !active.is_empty() {
            self.send(Action::StopRoutine { ids: active });
        }
        self.send(Action::RemoveRoutine { ids: ids.clone() });

        let removed = self.routines.remove(&ids);
        self.selection.prune(&self.routines);
        for entry in &removed {
            self.drop_routine_panels(&entry.name);
        }

        if removed.is_empty() {
            return;
        }
        let message = if removed.len() > REMOVAL_LIST_LIMIT {
            format!("{} routines removed.", removed.len())
        } else {
            let names: Vec<String> = removed.iter().map(|e| format!("'{}'", e.name)).collect();
            format!("{} removed.", names.join(", "))
        };
        self.status.push(message);
    }

    fn drop_routine_panels(&mut self, routine: &str) {
        for id in self.visibility.remove_group(routine) {
            self.workspace.remove_panel(&id);
        }
        self.workspace.remove_routine(routine);
    }

    fn hide_routine_info(&mut self) {
        self.routine_info_visible = false;
        self.options.select_routine(None);
    }

    /// Fire-and-forget stop for every listed routine.
    fn unload(&mut self) {
        let ids = self.routines.ids();
        if !ids.is_empty() {
            self.send(Action::StopRoutine { ids });
        }
        self.timer.stop();
    }

    /// One-way render snapshot.
    pub fn view(&self) -> DashboardView {
        let visible = self.visibility.visible_panels();
        let flow: HashMap<PanelId, Point> = if self.workspace.is_grid() {
            self.workspace
                .flow_positions(self.workspace.config.viewport.width, |id| {
                    visible.contains(id)
                })
                .into_iter()
                .collect()
        } else {
            HashMap::new()
        };

        let panels = self
            .workspace
            .ordered_panels()
            .map(|p| PanelView {
                id: p.id.clone(),
                routine: p.routine.clone(),
                kind: p.kind.clone(),
                size: p.size,
                position: if self.workspace.is_grid() {
                    flow.get(&p.id).copied().unwrap_or_default()
                } else {
                    p.position.unwrap_or_default()
                },
                visible: visible.contains(&p.id),
                highlighted: self.visibility.is_highlighted(&p.id),
            })
            .collect();

        let routines = self
            .routines
            .iter()
            .map(|e| RoutineRow {
                id: e.id.clone(),
                name: e.name.clone(),
                state: e.state,
                class: e.state.class(),
                selected: self.selection.contains(&e.id),
                shown: self.filter.matches(e),
            })
            .collect();

        let options = self
            .options
            .routine()
            .filter(|_| self.routine_info_visible)
            .map(|routine| OptionsView {
                routine: routine.to_string(),
                options: self.options.current().clone(),
                layout: self.options.layout(),
            });

        let slider = &self.analysis.slider;
        let row_height = &self.workspace.row_height;

        DashboardView {
            tree: self.tree.rows(),
            path_field: self.tree.path_field(),
            tree_buttons: self.tree.buttons(),
            routine_info_visible: self.routine_info_visible,
            routines,
            routine_buttons: self.buttons,
            filter: self.filter_text.clone(),
            analysis: AnalysisView {
                phase: self.analysis.phase(),
                buttons: self.analysis.buttons(),
                period_value: slider.value,
                period_min: slider.min,
                period_max: slider.max,
                period_display: slider.display(),
                elapsed: self.timer.display(),
            },
            plot_list: self.visibility.rows(),
            panels,
            layout_mode: self.workspace.mode,
            row_height: RowHeightView {
                value: row_height.value,
                min: row_height.min,
                max: row_height.max,
            },
            options,
            status: self.status.lines().iter().map(|l| l.render()).collect(),
            confirmation: self.confirmation.as_ref().map(Confirmation::message),
            log_path: self.status.path().map(|p| p.display().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{CallKind, RecordingChannel};
    use sd_core::{Size, TreePath};
    use sd_session::{RoutineState, ShotSelection};
    use serde_json::json;

    fn controller() -> DashboardController<RecordingChannel> {
        DashboardController::new(DashboardConfig::default(), RecordingChannel::new())
    }

    fn upload(c: &mut DashboardController<RecordingChannel>, name: &str) -> RoutineId {
        let id = RoutineId::from_filename(name);
        c.dispatch(UiEvent::UploadRoutine(Some(name.into()))).unwrap();
        c.dispatch(ServerEvent::RoutineUploaded {
            id: id.clone(),
            name: name.into(),
        })
        .unwrap();
        id
    }

    fn path(raw: &str) -> TreePath {
        TreePath::parse(raw).unwrap()
    }

    #[test]
    fn validation_failure_logs_and_sends_nothing() {
        let mut c = controller();
        assert!(c.dispatch(UiEvent::NewFolder(None)).is_err());
        assert!(c.dispatch(UiEvent::UploadRoutine(Some("notes.txt".into()))).is_err());
        assert!(c.dispatch(UiEvent::RunSelected).is_err());

        assert!(c.channel().calls.is_empty());
        assert_eq!(
            c.status().texts(),
            vec![
                "No folder name given",
                "'notes.txt' is not a Python script.",
                "No routine selected",
            ]
        );
    }

    #[test]
    fn upload_sends_request_and_ack_adds_entry() {
        let mut c = controller();
        let id = upload(&mut c, "fit.py");
        assert_eq!(c.channel().names(), vec!["add_routine"]);
        assert_eq!(c.routines().get(&id).unwrap().state, RoutineState::default());

        let err = c.dispatch(UiEvent::UploadRoutine(Some("fit.py".into())));
        assert!(err.is_err());
        assert_eq!(
            c.status().last(),
            Some("A routine with the name 'fit.py' already exists.")
        );
    }

    #[test]
    fn tree_folder_flow() {
        let mut c = controller();
        c.dispatch(UiEvent::NewFolder(Some("lab".into()))).unwrap();
        c.dispatch(ServerEvent::FolderAdded {
            parent: TreePath::root(),
            name: "lab".into(),
        })
        .unwrap();
        c.dispatch(UiEvent::TreeClicked(path("lab"))).unwrap();
        c.dispatch(UiEvent::NewFolder(Some("optics".into()))).unwrap();

        let calls = &c.channel().calls;
        assert_eq!(calls[0].args, vec![json!(""), json!("lab")]);
        assert_eq!(calls[1].args, vec![json!("lab"), json!("optics")]);
        assert_eq!(c.view().path_field, "lab");
        assert!(c.view().tree_buttons.remove);
    }

    #[test]
    fn removing_a_folder_needs_confirmation() {
        let mut c = controller();
        c.dispatch(ServerEvent::FolderAdded {
            parent: TreePath::root(),
            name: "lab".into(),
        })
        .unwrap();
        c.dispatch(UiEvent::TreeClicked(path("lab"))).unwrap();
        c.dispatch(UiEvent::RemoveSelectedNode).unwrap();
        assert!(c.channel().calls.is_empty());
        assert!(c.view().confirmation.unwrap().contains("sub-directories"));

        c.dispatch(UiEvent::Confirm(false)).unwrap();
        assert!(c.channel().calls.is_empty());
        assert!(c.confirmation().is_none());

        c.dispatch(UiEvent::RemoveSelectedNode).unwrap();
        c.dispatch(UiEvent::Confirm(true)).unwrap();
        assert_eq!(c.channel().names(), vec!["remove_folder"]);

        c.dispatch(ServerEvent::NodeRemoved { path: path("lab") })
            .unwrap();
        assert!(c.tree().is_empty());
        assert_eq!(c.status().last(), Some("Folder 'lab' removed successfully"));
    }

    #[test]
    fn selecting_routine_file_requests_info_once() {
        let mut c = controller();
        c.dispatch(ServerEvent::FileAdded {
            parent: TreePath::root(),
            name: "fit.py".into(),
            routine: true,
        })
        .unwrap();
        c.dispatch(UiEvent::TreeClicked(path("fit.py"))).unwrap();
        c.dispatch(UiEvent::TreeClicked(path("fit.py"))).unwrap();
        assert_eq!(c.channel().names(), vec!["display_routine_info"]);
        assert!(c.routine_info_visible());

        c.dispatch(UiEvent::Escape).unwrap();
        assert!(!c.routine_info_visible());
        assert!(c.view().options.is_none());
    }

    #[test]
    fn options_update_sends_type_then_options() {
        let mut c = controller();
        c.dispatch(ServerEvent::FileAdded {
            parent: TreePath::root(),
            name: "fit.py".into(),
            routine: true,
        })
        .unwrap();
        c.dispatch(UiEvent::TreeClicked(path("fit.py"))).unwrap();
        c.channel_mut().take();

        c.dispatch(UiEvent::SetSelectBy(ShotSelection::Latest)).unwrap();
        assert!(c.view().options.unwrap().layout.update_enabled);
        c.dispatch(UiEvent::UpdateOptions).unwrap();
        assert_eq!(
            c.channel().names(),
            vec!["set_analysis_type", "set_analysis_options"]
        );
        assert_eq!(c.channel().calls[0].args[1], json!("latest"));

        c.dispatch(UiEvent::SetNumShots(4)).unwrap();
        c.dispatch(UiEvent::RevertOptions).unwrap();
        assert_eq!(c.channel().names().last(), Some(&"refresh_analysis"));
        assert!(!c.options().has_draft());
    }

    #[test]
    fn pause_only_flips_on_acknowledgement() {
        let mut c = controller();
        let id = upload(&mut c, "fit.py");
        c.dispatch(UiEvent::RoutineClicked(id.clone())).unwrap();
        c.dispatch(UiEvent::RunSelected).unwrap();
        c.dispatch(UiEvent::PauseSelected).unwrap();
        assert_eq!(c.routines().get(&id).unwrap().state, RoutineState::Running);

        c.dispatch(ServerEvent::RoutineStatusChanged {
            id: id.clone(),
            status: StatusChange::Paused,
        })
        .unwrap();
        assert_eq!(c.routines().get(&id).unwrap().state, RoutineState::Paused);
        assert!(c.buttons().run);

        c.dispatch(UiEvent::RunSelected).unwrap();
        let last = c.channel().calls.last().unwrap();
        assert_eq!(last.kind, CallKind::Subscribe);
        assert_eq!(last.args, vec![json!(id.as_str()), json!(true)]);
    }

    #[test]
    fn removing_many_routines_summarises() {
        let mut c = DashboardController::new(
            DashboardConfig {
                confirm_destructive: false,
                ..DashboardConfig::default()
            },
            RecordingChannel::new(),
        );
        for name in ["a.py", "b.py", "c.py", "d.py"] {
            upload(&mut c, name);
        }
        c.dispatch(UiEvent::ToggleSelectAll).unwrap();
        assert!(c.buttons().select_all_checked);
        c.dispatch(UiEvent::RemoveSelected).unwrap();

        assert!(c.routines().is_empty());
        assert!(c.selection().is_empty());
        assert!(!c.buttons().select_all_checked);
        assert_eq!(c.status().last(), Some("4 routines removed."));
    }

    #[test]
    fn removing_few_routines_lists_names() {
        let mut c = DashboardController::new(
            DashboardConfig {
                confirm_destructive: false,
                ..DashboardConfig::default()
            },
            RecordingChannel::new(),
        );
        let a = upload(&mut c, "a.py");
        let b = upload(&mut c, "b.py");
        c.dispatch(UiEvent::RoutineClicked(a)).unwrap();
        c.dispatch(UiEvent::RoutineClicked(b)).unwrap();
        c.dispatch(UiEvent::RemoveSelected).unwrap();
        assert_eq!(c.status().last(), Some("'a.py', 'b.py' removed."));
    }

    #[test]
    fn stale_pushes_are_ignored() {
        let mut c = controller();
        let ghost = RoutineId::new("fghost");
        c.dispatch(ServerEvent::RoutineStatusChanged {
            id: ghost,
            status: StatusChange::Idle,
        })
        .unwrap();
        c.dispatch(ServerEvent::PanelImageReady {
            panel: PanelId::new("gone"),
            url: "u".into(),
            size: Size::new(10.0, 10.0),
        })
        .unwrap();
        assert!(c.status().lines().is_empty());
    }

    #[test]
    fn filter_policy_is_configurable() {
        let mut keep = controller();
        let id = upload(&mut keep, "fit.py");
        keep.dispatch(UiEvent::RoutineClicked(id.clone())).unwrap();
        keep.dispatch(UiEvent::FilterChanged("scan".into())).unwrap();
        assert!(keep.selection().contains(&id));
        assert!(!keep.view().routines[0].shown);

        let mut config = DashboardConfig::default();
        config.selection.filter_clears_selection = true;
        let mut clear = DashboardController::new(config, RecordingChannel::new());
        let id = upload(&mut clear, "fit.py");
        clear.dispatch(UiEvent::RoutineClicked(id)).unwrap();
        clear.dispatch(UiEvent::FilterChanged("scan".into())).unwrap();
        assert!(clear.selection().is_empty());
    }

    #[test]
    fn visible_scope_select_all_follows_filter() {
        let mut config = DashboardConfig::default();
        config.selection.select_all_scope = SelectAllScope::Visible;
        let mut c = DashboardController::new(config, RecordingChannel::new());
        let fit = upload(&mut c, "fit.py");
        let scan = upload(&mut c, "scan.py");

        c.dispatch(UiEvent::FilterChanged("fit".into())).unwrap();
        c.dispatch(UiEvent::ToggleSelectAll).unwrap();
        assert!(c.selection().contains(&fit));
        assert!(!c.selection().contains(&scan));
        assert!(c.buttons().select_all_checked);

        c.dispatch(UiEvent::FilterChanged(String::new())).unwrap();
        assert!(!c.buttons().select_all_checked);
    }

    #[test]
    fn analysis_loop_controls_and_timer() {
        let mut c = controller();
        c.dispatch(UiEvent::StartAnalysis).unwrap();
        assert!(!c.view().analysis.buttons.slider_enabled);
        assert!(c.dispatch(UiEvent::PeriodSliderMoved(1.0)).is_err());

        c.dispatch(ServerEvent::AnalysisStarted).unwrap();
        for _ in 0..150 {
            c.dispatch(Event::Tick).unwrap();
        }
        assert_eq!(c.view().analysis.elapsed, "1.50");

        c.dispatch(UiEvent::PauseAnalysis).unwrap();
        c.dispatch(ServerEvent::AnalysisPaused).unwrap();
        c.dispatch(Event::Tick).unwrap();
        assert_eq!(c.view().analysis.elapsed, "1.50");

        c.dispatch(UiEvent::PeriodSliderMoved(1.0)).unwrap();
        c.dispatch(UiEvent::StopAnalysis).unwrap();
        c.dispatch(ServerEvent::AnalysisStopped).unwrap();
        assert_eq!(c.view().analysis.elapsed, "0.00");

        assert_eq!(
            c.channel().names(),
            vec!["analyse", "pause_analysis", "stop_analysis"]
        );
        assert_eq!(c.channel().calls[0].args[0], json!(false));
    }

    #[test]
    fn resumed_analysis_sends_current_panels() {
        let mut c = controller();
        c.dispatch(UiEvent::StartAnalysis).unwrap();
        c.dispatch(ServerEvent::AnalysisStarted).unwrap();
        c.dispatch(ServerEvent::PlotCreated {
            routine: "fit.py".into(),
            panel: PanelId::for_plot("fit.py", "spectrum", 0),
            url: "/img/0.png".into(),
            size: Size::new(800.0, 600.0),
        })
        .unwrap();
        c.dispatch(UiEvent::PauseAnalysis).unwrap();
        c.dispatch(UiEvent::StartAnalysis).unwrap();

        let analyse = c.channel().calls.last().unwrap();
        assert_eq!(analyse.args[0], json!(true));
        assert_eq!(
            analyse.args[2],
            json!([{"id": "fit-py-spectrum-0", "file": "fit.py"}])
        );

        // a resume acknowledgement keeps the workspace
        c.dispatch(ServerEvent::AnalysisStarted).unwrap();
        assert_eq!(c.workspace().panels.len(), 1);
    }

    #[test]
    fn period_warning_shown_once() {
        let mut c = controller();
        c.dispatch(ServerEvent::PeriodWarning).unwrap();
        c.dispatch(ServerEvent::PeriodWarning).unwrap();
        assert_eq!(c.status().lines().len(), 1);
    }

    #[test]
    fn new_panels_start_hidden_and_show_brings_to_front() {
        let mut c = controller();
        let p0 = PanelId::for_plot("fit.py", "a", 0);
        let p1 = PanelId::for_plot("fit.py", "b", 0);
        for id in [&p0, &p1] {
            c.dispatch(ServerEvent::PlotCreated {
                routine: "fit.py".into(),
                panel: id.clone(),
                url: "/img.png".into(),
                size: Size::new(400.0, 300.0),
            })
            .unwrap();
        }
        assert!(c.view().panels.iter().all(|p| !p.visible));
        assert!(!c.view().plot_list[0].visible);

        c.dispatch(UiEvent::TogglePanel(p0.clone())).unwrap();
        let view = c.view();
        assert_eq!(view.panels.last().unwrap().id, p0);
        assert!(view.plot_list[0].visible);
    }

    #[test]
    fn unload_stops_every_routine() {
        let mut c = controller();
        let a = upload(&mut c, "a.py");
        let b = upload(&mut c, "b.py");
        c.channel_mut().take();

        c.dispatch(UiEvent::Unload).unwrap();
        assert_eq!(c.channel().names(), vec!["stop_routine"]);
        assert_eq!(
            c.channel().calls[0].args,
            vec![json!([a.as_str(), b.as_str()])]
        );
    }

    #[test]
    fn log_path_push_controls_mirroring() {
        let mut c = controller();
        c.dispatch(UiEvent::SetLog(String::new())).unwrap();
        assert_eq!(c.channel().calls[0].args, vec![json!("")]);

        let file = std::env::temp_dir().join(format!("sd-ctrl-{}.log", std::process::id()));
        c.dispatch(ServerEvent::LogPathChanged(file.display().to_string()))
            .unwrap();
        assert_eq!(c.view().log_path, Some(file.display().to_string()));
        c.dispatch(ServerEvent::LogPathChanged(String::new())).unwrap();
        assert_eq!(c.view().log_path, None);
        std::fs::remove_file(&file).ok();
    }

    #[test]
    fn data_dir_prompt_accepts_reset() {
        let mut c = controller();
        assert!(c.dispatch(UiEvent::SelectDataDir(None)).is_err());
        c.dispatch(UiEvent::SelectDataDir(Some("reset".into())))
            .unwrap();
        assert_eq!(
            c.channel().calls[0].args,
            vec![json!("reset"), json!(false), json!("")]
        );
    }
}
