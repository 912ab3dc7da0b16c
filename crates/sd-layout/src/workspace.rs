//! Runtime plot workspace management.
//!
//! Manages the collection of plot and table panels with drag/resize, the
//! free-form vs grid arrangement and the uniform row height slider.
//! Visibility is owned elsewhere; operations that depend on it take an
//! `is_visible` predicate.

use std::collections::HashMap;

use sd_core::{PanelId, Point, Size, Tolerances};
use serde::{Deserialize, Serialize};

use crate::panel::{Panel, PanelKind, TableRow};
use crate::row_height::RowHeightSlider;
use crate::scale::{fit_with_factor, fit_within};
use crate::{LayoutError, LayoutResult};

const CASCADE_ORIGIN: f32 = 10.0;
const CASCADE_STEP: f32 = 30.0;
const VIEWPORT_JITTER: f32 = 0.5;

/// Sizing rules of the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Size of the viewport hosting the workspace.
    pub viewport: Size,
    /// Fraction of the viewport a single panel may occupy.
    pub bound_fraction: f32,
    /// Factor applied to image pixels when a plot first appears.
    pub initial_factor: f32,
    /// Smallest edge a resize may produce.
    pub min_edge: f32,
    /// Spacing between panels in grid flow.
    pub flow_gap: f32,
    /// Size given to tables the renderer did not measure.
    pub default_table_size: Size,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            viewport: Size::new(1920.0, 1080.0),
            bound_fraction: 0.5,
            initial_factor: 0.5,
            min_edge: 30.0,
            flow_gap: 8.0,
            default_table_size: Size::new(240.0, 160.0),
        }
    }
}

impl LayoutConfig {
    /// Largest box a single panel may fill.
    pub fn bound(&self) -> Size {
        self.viewport.scaled(self.bound_fraction)
    }
}

/// Panel arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Panels float at absolute positions and can be dragged.
    #[default]
    Free,
    /// Panels flow in `panel_order`; dragging is disabled, reordering allowed.
    Grid,
}

/// Runtime plot workspace state.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub panels: HashMap<PanelId, Panel>,
    /// Stacking order (last is front-most) and grid flow order.
    pub panel_order: Vec<PanelId>,
    pub mode: LayoutMode,
    pub config: LayoutConfig,
    pub row_height: RowHeightSlider,
    pub dragging_panel_id: Option<PanelId>,
    pub drag_offset: Point,
    pub resizing_panel_id: Option<PanelId>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl Workspace {
    pub fn new(config: LayoutConfig) -> Self {
        let bound = config.bound();
        Self {
            panels: HashMap::new(),
            panel_order: Vec::new(),
            mode: LayoutMode::Free,
            config,
            row_height: RowHeightSlider::new(config.min_edge, bound.width.min(bound.height)),
            dragging_panel_id: None,
            drag_offset: Point::default(),
            resizing_panel_id: None,
        }
    }

    pub fn bound(&self) -> Size {
        self.config.bound()
    }

    /// The viewport changed size; the bounded box and slider range follow.
    ///
    /// Sub-pixel jitter from the renderer is ignored. Returns whether the
    /// viewport was updated.
    pub fn set_viewport(&mut self, viewport: Size) -> bool {
        let jitter = Tolerances {
            abs: VIEWPORT_JITTER,
            rel: 0.0,
        };
        if viewport.nearly_eq(self.config.viewport, jitter) {
            return false;
        }
        self.config.viewport = viewport;
        let bound = self.bound();
        self.row_height.set_max(bound.width.min(bound.height));
        true
    }

    pub fn is_grid(&self) -> bool {
        self.mode == LayoutMode::Grid
    }

    pub fn panel(&self, panel_id: &PanelId) -> Option<&Panel> {
        self.panels.get(panel_id)
    }

    pub fn contains(&self, panel_id: &PanelId) -> bool {
        self.panels.contains_key(panel_id)
    }

    /// Panels in stacking / flow order.
    pub fn ordered_panels(&self) -> impl Iterator<Item = &Panel> {
        self.panel_order.iter().filter_map(|id| self.panels.get(id))
    }

    fn cascade_position(&self) -> Point {
        let n = self.panels.len() as f32;
        Point::new(CASCADE_ORIGIN, CASCADE_ORIGIN + n * CASCADE_STEP)
    }

    fn insert(&mut self, panel: Panel) -> LayoutResult<&Panel> {
        if self.panels.contains_key(&panel.id) {
            return Err(LayoutError::DuplicatePanel(panel.id));
        }
        let id = panel.id.clone();
        self.panel_order.push(id.clone());
        self.panels.insert(id.clone(), panel);
        self.panels.get(&id).ok_or(LayoutError::PanelNotFound(id))
    }

    fn initial_position(&self) -> Option<Point> {
        match self.mode {
            LayoutMode::Free => Some(self.cascade_position()),
            LayoutMode::Grid => None,
        }
    }

    /// Create a plot panel sized from its first image.
    pub fn add_plot(
        &mut self,
        panel_id: PanelId,
        routine: &str,
        url: String,
        image_size: Size,
    ) -> LayoutResult<&Panel> {
        let size = fit_with_factor(image_size, self.bound(), self.config.initial_factor)?;
        let position = self.initial_position();
        self.insert(Panel {
            id: panel_id,
            routine: routine.to_string(),
            kind: PanelKind::Plot { url },
            natural: image_size,
            size,
            position,
            recorded_position: None,
        })
    }

    /// Create a table panel. `measured` is the size the renderer reported.
    pub fn add_table(
        &mut self,
        panel_id: PanelId,
        routine: &str,
        caption: String,
        rows: Vec<TableRow>,
        measured: Option<Size>,
    ) -> LayoutResult<&Panel> {
        let natural = measured.unwrap_or(self.config.default_table_size);
        let size = fit_within(natural, self.bound())?;
        let position = self.initial_position();
        self.insert(Panel {
            id: panel_id,
            routine: routine.to_string(),
            kind: PanelKind::Table { caption, rows },
            natural,
            size,
            position,
            recorded_position: None,
        })
    }

    /// A new image arrived for an existing plot.
    ///
    /// The current width is kept and the height follows the new image's
    /// aspect ratio, fitted back into the bounded box.
    pub fn update_plot_image(
        &mut self,
        panel_id: &PanelId,
        url: String,
        image_size: Size,
    ) -> LayoutResult<()> {
        let bound = self.bound();
        let panel = self
            .panels
            .get_mut(panel_id)
            .ok_or_else(|| LayoutError::PanelNotFound(panel_id.clone()))?;
        let width = panel.size.width;
        let target = Size::new(width, width / image_size.aspect());
        panel.size = fit_within(target, bound)?;
        panel.natural = image_size;
        panel.kind = PanelKind::Plot { url };
        Ok(())
    }

    pub fn update_table(
        &mut self,
        panel_id: &PanelId,
        caption: String,
        rows: Vec<TableRow>,
    ) -> LayoutResult<()> {
        let panel = self
            .panels
            .get_mut(panel_id)
            .ok_or_else(|| LayoutError::PanelNotFound(panel_id.clone()))?;
        panel.kind = PanelKind::Table { caption, rows };
        Ok(())
    }

    /// Delete a panel by ID.
    pub fn remove_panel(&mut self, panel_id: &PanelId) -> bool {
        self.panel_order.retain(|id| id != panel_id);
        if self.dragging_panel_id.as_ref() == Some(panel_id) {
            self.dragging_panel_id = None;
        }
        if self.resizing_panel_id.as_ref() == Some(panel_id) {
            self.resizing_panel_id = None;
        }
        self.panels.remove(panel_id).is_some()
    }

    /// Delete every panel emitted by `routine`, returning their ids.
    pub fn remove_routine(&mut self, routine: &str) -> Vec<PanelId> {
        let doomed: Vec<PanelId> = self
            .panel_order
            .iter()
            .filter(|id| self.panels.get(*id).is_some_and(|p| p.routine == routine))
            .cloned()
            .collect();
        for id in &doomed {
            self.remove_panel(id);
        }
        doomed
    }

    /// Session teardown or fresh analysis start.
    pub fn clear(&mut self) {
        self.panels.clear();
        self.panel_order.clear();
        self.dragging_panel_id = None;
        self.resizing_panel_id = None;
    }

    /// Raise a panel to the top of the stacking order.
    pub fn bring_to_front(&mut self, panel_id: &PanelId) -> bool {
        let Some(index) = self.panel_order.iter().position(|id| id == panel_id) else {
            return false;
        };
        let id = self.panel_order.remove(index);
        self.panel_order.push(id);
        true
    }

    /// Start dragging a panel grabbed at `pointer`.
    pub fn start_drag(&mut self, panel_id: &PanelId, pointer: Point) -> LayoutResult<()> {
        if self.is_grid() {
            return Err(LayoutError::GridLocked);
        }
        let panel = self
            .panels
            .get(panel_id)
            .ok_or_else(|| LayoutError::PanelNotFound(panel_id.clone()))?;
        let origin = panel.position.unwrap_or_default();
        self.drag_offset = Point::new(pointer.x - origin.x, pointer.y - origin.y);
        self.dragging_panel_id = Some(panel_id.clone());
        Ok(())
    }

    /// Follow the pointer with the dragged panel. No-op when nothing is dragged.
    pub fn drag_to(&mut self, pointer: Point) -> LayoutResult<()> {
        let Some(panel_id) = self.dragging_panel_id.clone() else {
            return Ok(());
        };
        let target = Point::new(
            (pointer.x - self.drag_offset.x).max(0.0),
            (pointer.y - self.drag_offset.y).max(0.0),
        );
        self.move_panel(&panel_id, target)
    }

    /// Stop dragging.
    pub fn stop_drag(&mut self) {
        self.dragging_panel_id = None;
    }

    /// Place a panel at an absolute position.
    pub fn move_panel(&mut self, panel_id: &PanelId, position: Point) -> LayoutResult<()> {
        if self.is_grid() {
            return Err(LayoutError::GridLocked);
        }
        let panel = self
            .panels
            .get_mut(panel_id)
            .ok_or_else(|| LayoutError::PanelNotFound(panel_id.clone()))?;
        panel.position = Some(position);
        Ok(())
    }

    /// Start resizing a panel.
    pub fn start_resize(&mut self, panel_id: &PanelId) -> bool {
        if !self.panels.contains_key(panel_id) {
            return false;
        }
        self.resizing_panel_id = Some(panel_id.clone());
        true
    }

    /// Stop resizing.
    pub fn stop_resize(&mut self) {
        self.resizing_panel_id = None;
    }

    /// Resize to `width`, keeping the aspect ratio and staying within
    /// `[min_edge, bound]`.
    pub fn resize_panel(&mut self, panel_id: &PanelId, width: f32) -> LayoutResult<Size> {
        let bound = self.bound();
        let min_edge = self.config.min_edge;
        let panel = self
            .panels
            .get_mut(panel_id)
            .ok_or_else(|| LayoutError::PanelNotFound(panel_id.clone()))?;

        // floor first: when both limits cannot hold, the bound wins
        let aspect = panel.size.aspect();
        let mut size = Size::new(width, width / aspect);
        let short = size.width.min(size.height);
        if short < min_edge {
            size = size.scaled(min_edge / short);
        }
        let size = fit_within(size, bound)?;
        panel.size = size;
        Ok(size)
    }

    /// Switch to grid mode: remember each absolute position, then strip it.
    pub fn enter_grid(&mut self) {
        if self.is_grid() {
            return;
        }
        self.stop_drag();
        for panel in self.panels.values_mut() {
            panel.recorded_position = panel.position.take();
        }
        self.mode = LayoutMode::Grid;
    }

    /// Leave grid mode, pinning every visible panel at its flow slot.
    ///
    /// `reported` carries locations the renderer actually drew and overrides
    /// the computed slots. Rearranging in the grid therefore moves panels
    /// permanently.
    pub fn exit_grid_in_flow(
        &mut self,
        container_width: f32,
        is_visible: impl Fn(&PanelId) -> bool,
        reported: &HashMap<PanelId, Point>,
    ) {
        if !self.is_grid() {
            return;
        }
        let mut rendered: HashMap<PanelId, Point> = self
            .flow_positions(container_width, is_visible)
            .into_iter()
            .collect();
        rendered.extend(reported.iter().map(|(id, p)| (id.clone(), *p)));
        self.exit_grid(&rendered);
    }

    /// Leave grid mode with explicit rendered locations.
    ///
    /// Panels missing from `rendered` have no rendered location (hidden ones)
    /// and fall back to their recorded position, then to a cascade slot.
    pub fn exit_grid(&mut self, rendered: &HashMap<PanelId, Point>) {
        if !self.is_grid() {
            return;
        }
        let mut fallback_index = 0.0;
        for id in &self.panel_order {
            let Some(panel) = self.panels.get_mut(id) else {
                continue;
            };
            let recorded = panel.recorded_position.take();
            panel.position = rendered.get(id).copied().or(recorded).or_else(|| {
                let p = Point::new(CASCADE_ORIGIN, CASCADE_ORIGIN + fallback_index * CASCADE_STEP);
                fallback_index += 1.0;
                Some(p)
            });
        }
        self.mode = LayoutMode::Free;
    }

    /// Sequential flow placement of the visible panels, wrapping rows at
    /// `container_width`.
    pub fn flow_positions(
        &self,
        container_width: f32,
        is_visible: impl Fn(&PanelId) -> bool,
    ) -> Vec<(PanelId, Point)> {
        let gap = self.config.flow_gap;
        let mut placed = Vec::new();
        let (mut x, mut y, mut row_height) = (gap, gap, 0.0_f32);
        for panel in self.ordered_panels().filter(|p| is_visible(&p.id)) {
            if x > gap && x + panel.size.width + gap > container_width {
                x = gap;
                y += row_height + gap;
                row_height = 0.0;
            }
            placed.push((panel.id.clone(), Point::new(x, y)));
            x += panel.size.width + gap;
            row_height = row_height.max(panel.size.height);
        }
        placed
    }

    /// Move a panel to `index` in the grid flow.
    pub fn move_in_flow(&mut self, panel_id: &PanelId, index: usize) -> LayoutResult<()> {
        if !self.is_grid() {
            return Err(LayoutError::GridRequired);
        }
        let current = self
            .panel_order
            .iter()
            .position(|id| id == panel_id)
            .ok_or_else(|| LayoutError::PanelNotFound(panel_id.clone()))?;
        let id = self.panel_order.remove(current);
        let index = index.min(self.panel_order.len());
        self.panel_order.insert(index, id);
        Ok(())
    }

    /// Mean height of the visible panels.
    pub fn mean_height(&self, is_visible: impl Fn(&PanelId) -> bool) -> Option<f32> {
        let heights: Vec<f32> = self
            .panels
            .values()
            .filter(|p| is_visible(&p.id))
            .map(|p| p.size.height)
            .collect();
        if heights.is_empty() {
            None
        } else {
            Some(heights.iter().sum::<f32>() / heights.len() as f32)
        }
    }

    /// Re-sync the slider after the visible set or a panel size changed.
    pub fn sync_row_height(&mut self, is_visible: impl Fn(&PanelId) -> bool) {
        let mean = self.mean_height(is_visible);
        self.row_height.sync_to_mean(mean);
    }

    /// Give every visible panel the same height, keeping each aspect ratio.
    ///
    /// Returns the height actually applied after slider clamping.
    pub fn apply_row_height(&mut self, height: f32, is_visible: impl Fn(&PanelId) -> bool) -> f32 {
        let height = self.row_height.set(height);
        for panel in self.panels.values_mut().filter(|p| is_visible(&p.id)) {
            let aspect = panel.size.aspect();
            panel.size = Size::new(height * aspect, height);
        }
        height
    }
}
