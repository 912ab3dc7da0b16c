use std::collections::HashMap;

use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Vec2, pos2, vec2};
use sd_app::{DashboardView, PanelView, UiEvent};
use sd_core::{PanelId, Point, Size};
use sd_layout::{LayoutMode, PanelKind};
use sd_session::HoverTarget;

use super::Actions;

const HEADER: f32 = 18.0;
const HANDLE: f32 = 12.0;
const MARGIN: f32 = 40.0;

/// Sidebar listing every panel grouped by routine.
#[derive(Default)]
pub struct PlotListView {
    hovered: Option<HoverTarget>,
}

impl PlotListView {
    pub fn show(&mut self, ui: &mut egui::Ui, view: &DashboardView, actions: &mut Actions) {
        ui.heading("Plots");
        if view.plot_list.is_empty() {
            ui.label("No plots yet");
        }

        let mut hovered = None;
        egui::ScrollArea::vertical()
            .id_salt("plot_list")
            .max_height(260.0)
            .show(ui, |ui| {
                for group in &view.plot_list {
                    let mut visible = group.visible;
                    let heading = ui.checkbox(&mut visible, egui::RichText::new(&group.name).strong());
                    if heading.changed() {
                        actions.push(UiEvent::ToggleGroup(group.name.clone()));
                    }
                    if heading.hovered() {
                        hovered = Some(HoverTarget::Group(group.name.clone()));
                    }
                    ui.indent(("group", group.name.as_str()), |ui| {
                        for item in &group.items {
                            let mut visible = item.visible;
                            let row = ui.checkbox(&mut visible, item.id.as_str());
                            if row.changed() {
                                actions.push(UiEvent::TogglePanel(item.id.clone()));
                            }
                            if row.hovered() {
                                hovered = Some(HoverTarget::Panel(item.id.clone()));
                            }
                        }
                    });
                }
            });

        if hovered != self.hovered {
            actions.push(match &hovered {
                Some(target) => UiEvent::HoverEnter(target.clone()),
                None => UiEvent::HoverLeave,
            });
            self.hovered = hovered;
        }
    }
}

/// Free-form / grid canvas of the visible panels.
#[derive(Default)]
pub struct WorkspaceView {
    viewport: Option<Size>,
    /// Where each visible panel was drawn last frame, in workspace coordinates.
    rendered: HashMap<PanelId, Point>,
}

fn to_point(pos: Pos2, origin: Pos2) -> Point {
    Point::new(pos.x - origin.x, pos.y - origin.y)
}

impl WorkspaceView {
    pub fn show(&mut self, ui: &mut egui::Ui, view: &DashboardView, actions: &mut Actions) {
        let grid = view.layout_mode == LayoutMode::Grid;

        ui.horizontal(|ui| {
            if ui.selectable_label(grid, "▦ Grid").clicked() {
                actions.push(UiEvent::ToggleGrid {
                    rendered: self.rendered.clone(),
                });
            }
            let rows = &view.row_height;
            let mut height = rows.value;
            if ui
                .add(egui::Slider::new(&mut height, rows.min..=rows.max).text("row height"))
                .changed()
            {
                actions.push(UiEvent::RowHeight(height));
            }
        });
        ui.separator();

        let available = ui.available_size();
        let viewport = Size::new(available.x, available.y);
        let changed = self.viewport.is_none_or(|last| {
            (last.width - viewport.width).abs() > 1.0 || (last.height - viewport.height).abs() > 1.0
        });
        if changed && viewport.is_positive() {
            self.viewport = Some(viewport);
            actions.push(UiEvent::ViewportResized(viewport));
        }

        let visible: Vec<&PanelView> = view.panels.iter().filter(|p| p.visible).collect();
        let extent = visible.iter().fold(available, |acc, p| {
            acc.max(vec2(
                p.position.x + p.size.width + MARGIN,
                p.position.y + p.size.height + HEADER + MARGIN,
            ))
        });

        egui::ScrollArea::both()
            .id_salt("workspace")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let (canvas, _) = ui.allocate_exact_size(extent, Sense::hover());
                self.rendered.clear();
                for (flow_index, panel) in visible.iter().enumerate() {
                    let flow = grid.then(|| FlowNeighbours::of(&view.panels, &visible, flow_index));
                    self.draw_panel(ui, canvas.min, panel, flow, actions);
                }
            });
    }

    fn draw_panel(
        &mut self,
        ui: &mut egui::Ui,
        origin: Pos2,
        panel: &PanelView,
        flow: Option<FlowNeighbours>,
        actions: &mut Actions,
    ) {
        let min = origin + vec2(panel.position.x, panel.position.y);
        let frame = Rect::from_min_size(min, vec2(panel.size.width, panel.size.height + HEADER));
        let header = Rect::from_min_size(min, vec2(panel.size.width, HEADER));
        let body = Rect::from_min_max(pos2(frame.left(), header.bottom()), frame.max);
        self.rendered.insert(panel.id.clone(), panel.position);

        let painter = ui.painter_at(frame.expand(2.0));
        let stroke = if panel.highlighted {
            Stroke::new(2.0, Color32::YELLOW)
        } else {
            Stroke::new(1.0, Color32::DARK_GRAY)
        };
        painter.rect(frame, 3.0, Color32::from_gray(28), stroke);
        painter.rect_filled(header, 3.0, Color32::from_gray(45));
        painter.text(
            header.left_center() + vec2(4.0, 0.0),
            Align2::LEFT_CENTER,
            panel.id.as_str(),
            FontId::proportional(11.0),
            Color32::LIGHT_GRAY,
        );

        match &panel.kind {
            PanelKind::Plot { url } => paint_plot(&painter, body, url),
            PanelKind::Table { caption, rows } => {
                let mut y = body.top() + 4.0;
                painter.text(
                    pos2(body.left() + 4.0, y),
                    Align2::LEFT_TOP,
                    caption,
                    FontId::proportional(12.0),
                    Color32::WHITE,
                );
                for row in rows {
                    y += 16.0;
                    painter.text(
                        pos2(body.left() + 4.0, y),
                        Align2::LEFT_TOP,
                        format!("{}: {}", row.name, row.value),
                        FontId::monospace(11.0),
                        Color32::LIGHT_GRAY,
                    );
                }
            }
        }

        let id = egui::Id::new(("panel", panel.id.as_str()));
        let response = ui.interact(frame, id, Sense::click_and_drag());
        if response.double_clicked() {
            actions.push(UiEvent::PanelDoubleClicked(panel.id.clone()));
        }

        match flow {
            None => {
                if let Some(pointer) = response.interact_pointer_pos() {
                    let pointer = to_point(pointer, origin);
                    if response.drag_started() {
                        actions.push(UiEvent::DragStart {
                            id: panel.id.clone(),
                            pointer,
                        });
                    } else if response.dragged() && response.drag_delta() != Vec2::ZERO {
                        actions.push(UiEvent::DragMove(pointer));
                    }
                }
                if response.drag_stopped() {
                    actions.push(UiEvent::DragEnd);
                }
            }
            Some(flow) => {
                let button = |offset: f32| {
                    Rect::from_min_size(
                        pos2(header.right() - offset, header.top() + 1.0),
                        vec2(16.0, HEADER - 2.0),
                    )
                };
                if let Some(index) = flow.before {
                    if ui.put(button(38.0), egui::Button::new("◀").small()).clicked() {
                        actions.push(UiEvent::MoveInFlow {
                            id: panel.id.clone(),
                            index,
                        });
                    }
                }
                if let Some(index) = flow.after {
                    if ui.put(button(19.0), egui::Button::new("▶").small()).clicked() {
                        actions.push(UiEvent::MoveInFlow {
                            id: panel.id.clone(),
                            index,
                        });
                    }
                }
            }
        }

        let handle_rect = Rect::from_min_size(frame.max - vec2(HANDLE, HANDLE), vec2(HANDLE, HANDLE));
        painter.rect_filled(handle_rect, 0.0, Color32::GRAY);
        let handle = ui.interact(handle_rect, id.with("resize"), Sense::drag());
        if handle.drag_started() {
            actions.push(UiEvent::ResizeStart(panel.id.clone()));
        } else if handle.dragged() {
            if let Some(pointer) = handle.interact_pointer_pos() {
                actions.push(UiEvent::Resize {
                    id: panel.id.clone(),
                    width: (pointer.x - frame.left()).max(1.0),
                });
            }
        }
        if handle.drag_stopped() {
            actions.push(UiEvent::ResizeEnd);
        }
    }
}

/// Flow indices a visible panel can move to, skipping hidden panels.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FlowNeighbours {
    before: Option<usize>,
    after: Option<usize>,
}

impl FlowNeighbours {
    fn of(all: &[PanelView], visible: &[&PanelView], flow_index: usize) -> Self {
        let order_of = |p: &PanelView| all.iter().position(|q| q.id == p.id);
        Self {
            before: flow_index
                .checked_sub(1)
                .and_then(|i| visible.get(i))
                .and_then(|p| order_of(*p)),
            after: visible.get(flow_index + 1).and_then(|p| order_of(*p)),
        }
    }
}

/// Images are not fetched; draw a trace that changes with each frame.
fn paint_plot(painter: &egui::Painter, body: Rect, url: &str) {
    let frame: f32 = url
        .rsplit('/')
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0);
    let steps = 64;
    let points: Vec<Pos2> = (0..=steps)
        .map(|i| {
            let t = i as f32 / steps as f32;
            let y = (t * std::f32::consts::TAU * 2.0 + frame * 0.4).sin();
            pos2(
                body.left() + t * body.width(),
                body.center().y - y * body.height() * 0.35,
            )
        })
        .collect();
    painter.add(egui::Shape::line(points, Stroke::new(1.5, Color32::LIGHT_BLUE)));
    painter.text(
        body.left_bottom() + vec2(4.0, -4.0),
        Align2::LEFT_BOTTOM,
        url,
        FontId::monospace(9.0),
        Color32::GRAY,
    );
}
