use crate::views::{
    Actions, AnalysisBar, DialogRequest, OptionsView, PlotListView, RoutineView, StatusView,
    TreeView, WorkspaceView,
};
use crate::worker::{LoopbackServer, WorkerChannel};
use egui_file_dialog::FileDialog;
use sd_app::{DashboardConfig, DashboardController, UiEvent};
use std::path::Path;
use std::time::{Duration, Instant};

pub struct DashboardApp {
    controller: DashboardController<WorkerChannel>,
    server: LoopbackServer,
    file_dialog: FileDialog,
    file_dialog_action: Option<DialogRequest>,
    tree_view: TreeView,
    routine_view: RoutineView,
    analysis_bar: AnalysisBar,
    plot_list: PlotListView,
    options_view: OptionsView,
    workspace_view: WorkspaceView,
    status_view: StatusView,
}

impl DashboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let (channel, server) = LoopbackServer::start(cc.egui_ctx.clone());

        Self {
            controller: DashboardController::new(config, channel),
            server,
            file_dialog: FileDialog::new(),
            file_dialog_action: None,
            tree_view: TreeView::default(),
            routine_view: RoutineView::default(),
            analysis_bar: AnalysisBar::default(),
            plot_list: PlotListView::default(),
            options_view: OptionsView::default(),
            workspace_view: WorkspaceView::default(),
            status_view: StatusView::default(),
        }
    }

    /// Feed every pending server push to the controller.
    fn poll_worker(&mut self) {
        while let Ok(event) = self.server.events_rx.try_recv() {
            // rejected pushes are already on the status log
            let _ = self.controller.dispatch(event);
        }
    }

    fn dispatch_all(&mut self, events: Vec<UiEvent>) {
        for event in events {
            let _ = self.controller.dispatch(event);
        }
    }

    fn open_dialog(&mut self, request: DialogRequest) {
        self.file_dialog_action = Some(request);
        match request {
            DialogRequest::UploadRoutine => self.file_dialog.select_file(),
            DialogRequest::DataDirectory => self.file_dialog.select_directory(),
            DialogRequest::LogFile => self.file_dialog.save_file(),
        }
    }

    fn dialog_selected(&mut self, path: &Path) {
        let event = match self.file_dialog_action.take() {
            Some(DialogRequest::UploadRoutine) => UiEvent::UploadRoutine(
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned()),
            ),
            Some(DialogRequest::DataDirectory) => {
                UiEvent::SelectDataDir(Some(path.display().to_string()))
            }
            Some(DialogRequest::LogFile) => UiEvent::SetLog(path.display().to_string()),
            None => return,
        };
        self.dispatch_all(vec![event]);
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_worker();
        self.controller.catch_up(Instant::now());

        let view = self.controller.view();
        let mut actions = Actions::default();

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            actions.push(UiEvent::Escape);
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                self.analysis_bar.show(ui, &view, &mut actions);
            });
        });

        egui::TopBottomPanel::bottom("status")
            .resizable(true)
            .default_height(120.0)
            .show(ctx, |ui| {
                self.status_view.show(ui, &view, &mut actions);
            });

        egui::SidePanel::left("routines")
            .default_width(260.0)
            .show(ctx, |ui| {
                self.tree_view.show(ui, &view, &mut actions);
                ui.separator();
                self.routine_view.show(ui, &view, &mut actions);
            });

        egui::SidePanel::right("plots")
            .default_width(260.0)
            .show(ctx, |ui| {
                self.plot_list.show(ui, &view, &mut actions);
                ui.separator();
                self.options_view.show(ui, &view, &mut actions);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.workspace_view.show(ui, &view, &mut actions);
        });

        if let Some(message) = &view.confirmation {
            egui::Window::new("Confirm")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.horizontal(|ui| {
                        if ui.button("Yes").clicked() {
                            actions.push(UiEvent::Confirm(true));
                        }
                        if ui.button("No").clicked() {
                            actions.push(UiEvent::Confirm(false));
                        }
                    });
                });
        }

        let Actions { events, dialog } = actions;
        self.dispatch_all(events);
        if let Some(request) = dialog {
            self.open_dialog(request);
        }

        self.file_dialog.update(ctx);
        if let Some(path) = self.file_dialog.take_selected() {
            self.dialog_selected(&path);
        }

        if self.controller.timer().is_running() {
            let period = self.controller.timer().period();
            ctx.request_repaint_after(period.max(Duration::from_millis(10)));
        }
    }
}

impl Drop for DashboardApp {
    fn drop(&mut self) {
        let _ = self.controller.dispatch(UiEvent::Unload);
    }
}
