//! Multi-selection of routine entries and the derived control buttons.

use std::collections::HashSet;

use sd_core::RoutineId;
use serde::{Deserialize, Serialize};

use crate::lifecycle::RoutineList;

/// Which entries the select-all control compares the selection against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectAllScope {
    /// Every listed routine.
    #[default]
    Total,
    /// Only routines that pass the current filter.
    Visible,
}

/// Set of selected routine ids.
///
/// Members always exist in the routine list; [`RoutineSelection::prune`]
/// runs after every removal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutineSelection {
    selected: HashSet<RoutineId>,
    /// Selection state applied to every entry the pointer drags over.
    drag_target: Option<bool>,
}

impl RoutineSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &RoutineId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected ids in routine list order.
    pub fn ordered(&self, list: &RoutineList) -> Vec<RoutineId> {
        list.iter()
            .filter(|e| self.selected.contains(&e.id))
            .map(|e| e.id.clone())
            .collect()
    }

    /// Click on a single entry. Returns the new membership.
    pub fn toggle(&mut self, id: &RoutineId) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    pub fn set(&mut self, id: &RoutineId, selected: bool) {
        if selected {
            self.selected.insert(id.clone());
        } else {
            self.selected.remove(id);
        }
    }

    /// Shift-press on an entry: toggles it and remembers the resulting state
    /// for the rest of the drag.
    pub fn begin_drag(&mut self, id: &RoutineId) {
        let state = self.toggle(id);
        self.drag_target = Some(state);
    }

    /// Pointer entered an entry while dragging.
    pub fn drag_enter(&mut self, id: &RoutineId) {
        if let Some(target) = self.drag_target {
            self.set(id, target);
        }
    }

    pub fn end_drag(&mut self) {
        self.drag_target = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_target.is_some()
    }

    /// Non-empty `universe` fully contained in the selection.
    pub fn is_all_selected(&self, universe: &[RoutineId]) -> bool {
        !universe.is_empty() && universe.iter().all(|id| self.selected.contains(id))
    }

    /// Select-all control clicked: select the universe, or clear it when it
    /// is already fully selected.
    pub fn toggle_all(&mut self, universe: &[RoutineId]) {
        if self.is_all_selected(universe) {
            for id in universe {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(universe.iter().cloned());
        }
    }

    /// Escape or explicit unselect.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.drag_target = None;
    }

    /// Drop ids that are no longer listed.
    pub fn prune(&mut self, list: &RoutineList) {
        self.selected.retain(|id| list.contains(id));
    }
}

/// Enabled state of the routine control buttons plus the select-all checkbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlButtons {
    pub run: bool,
    pub pause: bool,
    pub stop: bool,
    pub remove: bool,
    pub unselect: bool,
    pub select_all_checked: bool,
}

impl ControlButtons {
    /// Recompute from scratch; never patched incrementally.
    pub fn derive(selection: &RoutineSelection, list: &RoutineList, universe: &[RoutineId]) -> Self {
        let members: Vec<_> = list.iter().filter(|e| selection.contains(&e.id)).collect();
        let any_selected = !members.is_empty();
        let any_active = members.iter().any(|e| e.state.is_active());

        Self {
            run: members.iter().any(|e| !e.state.is_running()),
            pause: any_active,
            stop: any_active,
            remove: any_selected,
            unselect: any_selected,
            select_all_checked: selection.is_all_selected(universe),
        }
    }
}
