//! Panel and routine-group visibility, single source of truth for both the
//! plot-list sidebar and the workspace.

use std::collections::HashSet;

use sd_core::PanelId;
use serde::{Deserialize, Serialize};

use crate::{SessionError, SessionResult};

#[derive(Debug, Clone, PartialEq)]
struct Group {
    name: String,
    panels: Vec<PanelId>,
}

/// Sidebar entry the pointer is over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum HoverTarget {
    Panel(PanelId),
    Group(String),
}

/// Render row for one panel in the sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRow {
    pub id: PanelId,
    pub visible: bool,
    pub highlighted: bool,
}

/// Render row for one routine group heading and its panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
    pub name: String,
    pub visible: bool,
    pub items: Vec<ItemRow>,
}

/// Per-panel visibility flags grouped by routine.
///
/// A group's flag is never stored: it is visible iff at least one of its
/// panels is visible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibilityModel {
    groups: Vec<Group>,
    visible: HashSet<PanelId>,
    /// Transient hover hint, not part of any saved state.
    highlighted: HashSet<PanelId>,
}

impl VisibilityModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the heading for a routine. Returns false if it already exists.
    pub fn add_group(&mut self, name: &str) -> bool {
        if self.has_group(name) {
            return false;
        }
        self.groups.push(Group {
            name: name.to_string(),
            panels: Vec::new(),
        });
        true
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g.name == name)
    }

    /// Register a panel under `group`, creating the group on first use.
    pub fn add_panel(&mut self, group: &str, id: PanelId, visible: bool) {
        self.add_group(group);
        if let Some(g) = self.groups.iter_mut().find(|g| g.name == group) {
            if !g.panels.contains(&id) {
                g.panels.push(id.clone());
            }
        }
        self.set_panel_visible_unchecked(&id, visible);
    }

    pub fn contains(&self, id: &PanelId) -> bool {
        self.groups.iter().any(|g| g.panels.contains(id))
    }

    pub fn group_of(&self, id: &PanelId) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| g.panels.contains(id))
            .map(|g| g.name.as_str())
    }

    pub fn is_visible(&self, id: &PanelId) -> bool {
        self.visible.contains(id)
    }

    pub fn is_highlighted(&self, id: &PanelId) -> bool {
        self.highlighted.contains(id)
    }

    /// Derived heading flag.
    pub fn group_visible(&self, name: &str) -> SessionResult<bool> {
        let group = self.group(name)?;
        Ok(group.panels.iter().any(|p| self.visible.contains(p)))
    }

    pub fn group_panels(&self, name: &str) -> SessionResult<&[PanelId]> {
        Ok(&self.group(name)?.panels)
    }

    /// Toggle one panel; the heading is re-derived on read.
    pub fn toggle_panel(&mut self, id: &PanelId) -> SessionResult<bool> {
        let next = !self.is_visible(id);
        self.set_panel_visible(id, next)?;
        Ok(next)
    }

    pub fn set_panel_visible(&mut self, id: &PanelId, visible: bool) -> SessionResult<()> {
        if !self.contains(id) {
            return Err(SessionError::UnknownPanel(id.clone()));
        }
        self.set_panel_visible_unchecked(id, visible);
        Ok(())
    }

    fn set_panel_visible_unchecked(&mut self, id: &PanelId, visible: bool) {
        if visible {
            self.visible.insert(id.clone());
        } else {
            self.visible.remove(id);
        }
    }

    /// Toggle a heading: every child is set to the opposite of the heading's
    /// current flag. Returns the new heading flag.
    pub fn toggle_group(&mut self, name: &str) -> SessionResult<bool> {
        let target = !self.group_visible(name)?;
        let panels = self.group(name)?.panels.clone();
        for id in &panels {
            self.set_panel_visible_unchecked(id, target);
        }
        self.group_visible(name)
    }

    pub fn hover_enter(&mut self, target: &HoverTarget) {
        self.highlighted = self.targets(target).into_iter().collect();
    }

    pub fn hover_leave(&mut self) {
        self.highlighted.clear();
    }

    fn targets(&self, target: &HoverTarget) -> Vec<PanelId> {
        match target {
            HoverTarget::Panel(id) if self.contains(id) => vec![id.clone()],
            HoverTarget::Panel(_) => Vec::new(),
            HoverTarget::Group(name) => self
                .group(name)
                .map(|g| g.panels.clone())
                .unwrap_or_default(),
        }
    }

    pub fn remove_panel(&mut self, id: &PanelId) -> bool {
        let mut found = false;
        for g in &mut self.groups {
            let before = g.panels.len();
            g.panels.retain(|p| p != id);
            found |= g.panels.len() != before;
        }
        self.visible.remove(id);
        self.highlighted.remove(id);
        found
    }

    /// Drop a routine's heading and all of its panels.
    pub fn remove_group(&mut self, name: &str) -> Vec<PanelId> {
        let Some(index) = self.groups.iter().position(|g| g.name == name) else {
            return Vec::new();
        };
        let group = self.groups.remove(index);
        for id in &group.panels {
            self.visible.remove(id);
            self.highlighted.remove(id);
        }
        group.panels
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.visible.clear();
        self.highlighted.clear();
    }

    pub fn visible_panels(&self) -> &HashSet<PanelId> {
        &self.visible
    }

    pub fn rows(&self) -> Vec<GroupRow> {
        self.groups
            .iter()
            .map(|g| GroupRow {
                name: g.name.clone(),
                visible: g.panels.iter().any(|p| self.visible.contains(p)),
                items: g
                    .panels
                    .iter()
                    .map(|p| ItemRow {
                        id: p.clone(),
                        visible: self.visible.contains(p),
                        highlighted: self.highlighted.contains(p),
                    })
                    .collect(),
            })
            .collect()
    }

    fn group(&self, name: &str) -> SessionResult<&Group> {
        self.groups
            .iter()
            .find(|g| g.name == name)
            .ok_or_else(|| SessionError::UnknownGroup(name.to_string()))
    }
}
