use sd_app::{DashboardView, UiEvent};
use sd_session::NodeKind;

use super::Actions;

#[derive(Default)]
pub struct TreeView {
    folder_name: String,
}

impl TreeView {
    pub fn show(&mut self, ui: &mut egui::Ui, view: &DashboardView, actions: &mut Actions) {
        ui.heading("Routine files");

        ui.horizontal(|ui| {
            ui.label("Path:");
            ui.monospace(if view.path_field.is_empty() {
                "/"
            } else {
                view.path_field.as_str()
            });
        });

        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.folder_name)
                    .hint_text("folder name")
                    .desired_width(120.0),
            );
            if ui.button("+ Folder").clicked() {
                actions.push(UiEvent::NewFolder(Some(std::mem::take(
                    &mut self.folder_name,
                ))));
            }
        });

        ui.horizontal(|ui| {
            if ui
                .add_enabled(view.tree_buttons.remove, egui::Button::new("Remove"))
                .clicked()
            {
                actions.push(UiEvent::RemoveSelectedNode);
            }
            if ui
                .add_enabled(view.tree_buttons.unselect, egui::Button::new("Unselect"))
                .clicked()
            {
                actions.push(UiEvent::TreeUnselect);
            }
        });

        ui.separator();

        if view.tree.is_empty() {
            ui.label("No files");
            return;
        }

        egui::ScrollArea::vertical()
            .id_salt("file_tree")
            .max_height(220.0)
            .show(ui, |ui| {
                for row in &view.tree {
                    let icon = match (row.kind, row.expanded) {
                        (NodeKind::Folder, true) => "📂",
                        (NodeKind::Folder, false) => "📁",
                        (NodeKind::Routine, _) => "🐍",
                        (NodeKind::Support, _) => "📄",
                    };
                    ui.horizontal(|ui| {
                        ui.add_space(row.depth as f32 * 14.0);
                        if ui
                            .selectable_label(row.selected, format!("{icon} {}", row.name))
                            .clicked()
                        {
                            actions.push(UiEvent::TreeClicked(row.path.clone()));
                        }
                    });
                }
            });
    }
}
