use egui::{Color32, RichText};
use sd_app::{DashboardView, UiEvent};
use sd_core::RoutineId;

use super::{Actions, DialogRequest};

/// Routine list with its control buttons.
///
/// Shift-drag across entries paints them all to the state of the first one.
#[derive(Default)]
pub struct RoutineView {
    filter: String,
    dragging: bool,
    drag_row: Option<RoutineId>,
}

fn class_color(class: &str) -> Color32 {
    match class {
        "running" => Color32::from_rgb(60, 170, 90),
        "paused" => Color32::from_rgb(210, 160, 40),
        "error" => Color32::from_rgb(210, 70, 60),
        _ => Color32::GRAY,
    }
}

impl RoutineView {
    pub fn show(&mut self, ui: &mut egui::Ui, view: &DashboardView, actions: &mut Actions) {
        ui.heading("Routines");

        if ui.button("Upload routine…").clicked() {
            actions.dialog = Some(DialogRequest::UploadRoutine);
        }

        ui.horizontal(|ui| {
            ui.label("Filter:");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.filter)
                    .hint_text("name or \"running state\"")
                    .desired_width(150.0),
            );
            if response.changed() {
                actions.push(UiEvent::FilterChanged(self.filter.clone()));
            }
        });

        let buttons = view.routine_buttons;
        ui.horizontal(|ui| {
            let mut all = buttons.select_all_checked;
            if ui.checkbox(&mut all, "All").changed() {
                actions.push(UiEvent::ToggleSelectAll);
            }
            for (enabled, label, event) in [
                (buttons.run, "▶ Run", UiEvent::RunSelected),
                (buttons.pause, "⏸ Pause", UiEvent::PauseSelected),
                (buttons.stop, "⏹ Stop", UiEvent::StopSelected),
                (buttons.remove, "🗑", UiEvent::RemoveSelected),
                (buttons.unselect, "Unselect", UiEvent::UnselectRoutines),
            ] {
                if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
                    actions.push(event);
                }
            }
        });

        ui.separator();

        let (shift, primary_down) = ui
            .ctx()
            .input(|i| (i.modifiers.shift, i.pointer.primary_down()));

        egui::ScrollArea::vertical()
            .id_salt("routine_list")
            .show(ui, |ui| {
                for row in view.routines.iter().filter(|r| r.shown) {
                    let text = RichText::new(format!("{}  [{}]", row.name, row.class))
                        .color(class_color(row.class));
                    let response = ui
                        .add(egui::SelectableLabel::new(row.selected, text))
                        .interact(egui::Sense::click_and_drag());

                    if shift && response.drag_started() {
                        self.dragging = true;
                        self.drag_row = Some(row.id.clone());
                        actions.push(UiEvent::RoutineDragStart(row.id.clone()));
                    } else if response.clicked() {
                        actions.push(UiEvent::RoutineClicked(row.id.clone()));
                    } else if self.dragging
                        && ui.rect_contains_pointer(response.rect)
                        && self.drag_row.as_ref() != Some(&row.id)
                    {
                        self.drag_row = Some(row.id.clone());
                        actions.push(UiEvent::RoutineDragEnter(row.id.clone()));
                    }
                }
                if view.routines.is_empty() {
                    ui.label("No routines uploaded");
                }
            });

        if self.dragging && !primary_down {
            self.dragging = false;
            self.drag_row = None;
            actions.push(UiEvent::RoutineDragEnd);
        }
    }
}
