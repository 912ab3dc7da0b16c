use sd_app::{DashboardView, UiEvent};
use sd_session::{AnalysisOptions, ShotSelection};

use super::{Actions, DialogRequest};

fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Routine info: analysis options of the routine selected in the file tree.
#[derive(Default)]
pub struct OptionsView {
    choice_text: String,
    filetypes_text: String,
    shots_dir: String,
    /// Options the text buffers were last filled from.
    synced: Option<AnalysisOptions>,
}

impl OptionsView {
    pub fn show(&mut self, ui: &mut egui::Ui, view: &DashboardView, actions: &mut Actions) {
        ui.heading("Data");
        ui.horizontal(|ui| {
            if ui.button("Data directory…").clicked() {
                actions.dialog = Some(DialogRequest::DataDirectory);
            }
            if ui.button("Reset").on_hover_text("Use the default data directory").clicked() {
                actions.push(UiEvent::SelectDataDir(Some("reset".to_string())));
            }
        });

        let Some(info) = view.options.as_ref().filter(|_| view.routine_info_visible) else {
            self.synced = None;
            ui.label("Select a routine file to edit its analysis options");
            return;
        };

        if self.synced.as_ref() != Some(&info.options) {
            self.choice_text = info.options.shots_choice.join(", ");
            self.filetypes_text = info.options.filetypes.join(", ");
            self.synced = Some(info.options.clone());
        }

        ui.separator();
        ui.heading(format!("Routine: {}", info.routine));

        ui.horizontal(|ui| {
            ui.label("Shots dir:");
            ui.add(egui::TextEdit::singleline(&mut self.shots_dir).desired_width(140.0));
            if ui.button("Set").clicked() {
                actions.push(UiEvent::SetShotsDir(self.shots_dir.trim().to_string()));
            }
        });

        let mut select_by = info.options.select_by;
        egui::ComboBox::from_label("Select shots by")
            .selected_text(select_by.as_str())
            .show_ui(ui, |ui| {
                for method in ShotSelection::ALL {
                    ui.selectable_value(&mut select_by, method, method.as_str());
                }
            });
        if select_by != info.options.select_by {
            actions.push(UiEvent::SetSelectBy(select_by));
        }

        let layout = info.layout;
        if layout.show_num_shots {
            let mut num_shots = info.options.num_shots;
            ui.horizontal(|ui| {
                ui.label("Number of shots:");
                if ui
                    .add(egui::DragValue::new(&mut num_shots).range(1..=10_000))
                    .changed()
                {
                    actions.push(UiEvent::SetNumShots(num_shots));
                }
            });
        }

        if layout.show_choice {
            ui.label(format!("Shots (at most {}):", layout.choice_limit));
            let response = ui.text_edit_singleline(&mut self.choice_text);
            if response.lost_focus() {
                actions.push(UiEvent::SetShotsChoice(split_list(&self.choice_text)));
            }
        }

        if layout.show_filetypes {
            ui.label("File types:");
            let response = ui.text_edit_singleline(&mut self.filetypes_text);
            if response.lost_focus() {
                actions.push(UiEvent::SetFiletypes(split_list(&self.filetypes_text)));
            }
        }

        ui.horizontal(|ui| {
            if ui
                .add_enabled(layout.update_enabled, egui::Button::new("Update"))
                .clicked()
            {
                actions.push(UiEvent::UpdateOptions);
            }
            if ui
                .add_enabled(layout.revert_enabled, egui::Button::new("Revert"))
                .clicked()
            {
                actions.push(UiEvent::RevertOptions);
            }
        });
    }
}
