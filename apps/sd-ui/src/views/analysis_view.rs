use sd_app::{DashboardView, UiEvent};

use super::Actions;

/// Analysis loop controls shown in the toolbar.
#[derive(Default)]
pub struct AnalysisBar {
    period_text: String,
}

impl AnalysisBar {
    pub fn show(&mut self, ui: &mut egui::Ui, view: &DashboardView, actions: &mut Actions) {
        let analysis = &view.analysis;
        let buttons = analysis.buttons;

        ui.label("Analysis:");
        if ui
            .add_enabled(buttons.start, egui::Button::new("▶ Start"))
            .clicked()
        {
            actions.push(UiEvent::StartAnalysis);
        }
        if ui
            .add_enabled(buttons.pause, egui::Button::new("⏸ Pause"))
            .clicked()
        {
            actions.push(UiEvent::PauseAnalysis);
        }
        if ui
            .add_enabled(buttons.stop, egui::Button::new("⏹ Stop"))
            .clicked()
        {
            actions.push(UiEvent::StopAnalysis);
        }

        ui.separator();

        let mut value = analysis.period_value;
        let slider = ui.add_enabled(
            buttons.slider_enabled,
            egui::Slider::new(&mut value, analysis.period_min..=analysis.period_max)
                .step_by(0.001)
                .show_value(false)
                .text("period"),
        );
        if slider.changed() {
            actions.push(UiEvent::PeriodSliderMoved(value));
        }
        ui.label(format!("{} s", analysis.period_display));

        let typed = ui.add_enabled(
            buttons.slider_enabled,
            egui::TextEdit::singleline(&mut self.period_text)
                .hint_text("seconds")
                .desired_width(60.0),
        );
        if typed.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            let period = self.period_text.trim().parse().unwrap_or(f64::NAN);
            self.period_text.clear();
            actions.push(UiEvent::PeriodTyped(period));
        }

        ui.separator();
        ui.monospace(format!("⏱ {}", analysis.elapsed));
        ui.label(format!("({})", analysis.phase));
    }
}
