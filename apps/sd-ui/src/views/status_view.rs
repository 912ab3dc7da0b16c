use sd_app::{DashboardView, UiEvent};

use super::{Actions, DialogRequest};

#[derive(Default)]
pub struct StatusView;

impl StatusView {
    pub fn show(&mut self, ui: &mut egui::Ui, view: &DashboardView, actions: &mut Actions) {
        ui.horizontal(|ui| {
            ui.strong("Status");
            ui.separator();
            match &view.log_path {
                Some(path) => {
                    ui.label(format!("Logging to {path}"));
                    if ui.button("Stop logging").clicked() {
                        actions.push(UiEvent::SetLog(String::new()));
                    }
                }
                None => {
                    if ui.button("Log to file…").clicked() {
                        actions.dialog = Some(DialogRequest::LogFile);
                    }
                }
            }
        });

        egui::ScrollArea::vertical()
            .id_salt("status_log")
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for line in &view.status {
                    ui.monospace(line);
                }
            });
    }
}
