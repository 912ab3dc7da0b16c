//! Analysis options of the selected routine and the unsaved draft.

use serde::{Deserialize, Serialize};

use crate::{SessionError, SessionResult};

/// How a routine picks the shots it analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotSelection {
    #[default]
    All,
    New,
    Modified,
    Latest,
    Choice,
}

impl ShotSelection {
    pub const ALL: [ShotSelection; 5] = [
        ShotSelection::All,
        ShotSelection::New,
        ShotSelection::Modified,
        ShotSelection::Latest,
        ShotSelection::Choice,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShotSelection::All => "all",
            ShotSelection::New => "new",
            ShotSelection::Modified => "modified",
            ShotSelection::Latest => "latest",
            ShotSelection::Choice => "choice",
        }
    }

    /// Methods that take a shot count.
    pub fn uses_num_shots(self) -> bool {
        matches!(self, ShotSelection::Latest | ShotSelection::Choice)
    }
}

/// Committed or draft options of one routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub select_by: ShotSelection,
    pub num_shots: u32,
    /// Explicit shot names; only meaningful for [`ShotSelection::Choice`].
    pub shots_choice: Vec<String>,
    /// File types considered when not choosing shots explicitly.
    pub filetypes: Vec<String>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            select_by: ShotSelection::All,
            num_shots: 1,
            shots_choice: Vec::new(),
            filetypes: Vec::new(),
        }
    }
}

/// Which option widgets are shown and enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsLayout {
    pub show_num_shots: bool,
    pub show_choice: bool,
    pub show_filetypes: bool,
    pub choice_limit: u32,
    pub update_enabled: bool,
    pub revert_enabled: bool,
}

/// Options editor bound to the routine selected in the file tree.
///
/// The draft exists from the first change until it is flushed, reverted, or
/// the selected routine changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsEditor {
    routine: Option<String>,
    saved: AnalysisOptions,
    draft: Option<AnalysisOptions>,
}

impl OptionsEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routine(&self) -> Option<&str> {
        self.routine.as_deref()
    }

    /// Bind to another routine; any draft is discarded.
    pub fn select_routine(&mut self, name: Option<&str>) {
        if self.routine.as_deref() != name {
            self.routine = name.map(str::to_string);
            self.saved = AnalysisOptions::default();
        }
        self.draft = None;
    }

    /// Server sent the committed options of `name`.
    pub fn load(&mut self, name: &str, options: AnalysisOptions) {
        self.routine = Some(name.to_string());
        self.saved = options;
        self.draft = None;
    }

    pub fn has_draft(&self) -> bool {
        self.draft.is_some()
    }

    /// Draft if there is one, otherwise the committed options.
    pub fn current(&self) -> &AnalysisOptions {
        self.draft.as_ref().unwrap_or(&self.saved)
    }

    pub fn saved(&self) -> &AnalysisOptions {
        &self.saved
    }

    fn draft_mut(&mut self) -> SessionResult<&mut AnalysisOptions> {
        if self.routine.is_none() {
            return Err(SessionError::NoRoutineSelected);
        }
        let saved = &self.saved;
        Ok(self.draft.get_or_insert_with(|| saved.clone()))
    }

    pub fn set_select_by(&mut self, method: ShotSelection) -> SessionResult<()> {
        self.draft_mut()?.select_by = method;
        Ok(())
    }

    /// Changing the count clears the explicit choice.
    pub fn set_num_shots(&mut self, num_shots: u32) -> SessionResult<()> {
        let draft = self.draft_mut()?;
        draft.num_shots = num_shots.max(1);
        draft.shots_choice.clear();
        Ok(())
    }

    pub fn set_shots_choice(&mut self, shots: Vec<String>) -> SessionResult<()> {
        let draft = self.draft_mut()?;
        if shots.len() > draft.num_shots as usize {
            return Err(SessionError::ChoiceLimit {
                limit: draft.num_shots,
            });
        }
        draft.shots_choice = shots;
        Ok(())
    }

    pub fn set_filetypes(&mut self, filetypes: Vec<String>) -> SessionResult<()> {
        self.draft_mut()?.filetypes = filetypes;
        Ok(())
    }

    /// Commit the draft. Returns the routine name and the options to send.
    pub fn flush(&mut self) -> SessionResult<Option<(String, AnalysisOptions)>> {
        let name = self.routine.clone().ok_or(SessionError::NoRoutineSelected)?;
        let Some(draft) = self.draft.take() else {
            return Ok(None);
        };
        self.saved = draft.clone();
        Ok(Some((name, draft)))
    }

    /// Drop the draft. Returns the routine whose options should be reloaded.
    pub fn revert(&mut self) -> Option<String> {
        self.draft.take()?;
        self.routine.clone()
    }

    pub fn layout(&self) -> OptionsLayout {
        let current = self.current();
        let is_choice = current.select_by == ShotSelection::Choice;
        OptionsLayout {
            show_num_shots: current.select_by.uses_num_shots(),
            show_choice: is_choice,
            show_filetypes: !is_choice,
            choice_limit: current.num_shots,
            update_enabled: self.has_draft(),
            revert_enabled: self.has_draft(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> OptionsEditor {
        let mut e = OptionsEditor::new();
        e.load("fit.py", AnalysisOptions::default());
        e
    }

    #[test]
    fn edits_need_a_routine() {
        let mut e = OptionsEditor::new();
        assert_eq!(
            e.set_select_by(ShotSelection::New),
            Err(SessionError::NoRoutineSelected)
        );
        assert!(!e.has_draft());
    }

    #[test]
    fn layout_follows_method() {
        let mut e = editor();
        let l = e.layout();
        assert!(!l.show_num_shots && !l.show_choice && l.show_filetypes);
        assert!(!l.update_enabled && !l.revert_enabled);

        e.set_select_by(ShotSelection::Latest).unwrap();
        let l = e.layout();
        assert!(l.show_num_shots && !l.show_choice);
        assert!(l.update_enabled && l.revert_enabled);

        e.set_select_by(ShotSelection::Choice).unwrap();
        let l = e.layout();
        assert!(l.show_num_shots && l.show_choice && !l.show_filetypes);
    }

    #[test]
    fn choice_is_limited_and_cleared_by_count() {
        let mut e = editor();
        e.set_select_by(ShotSelection::Choice).unwrap();
        e.set_num_shots(2).unwrap();
        assert_eq!(
            e.set_shots_choice(vec!["a".into(), "b".into(), "c".into()]),
            Err(SessionError::ChoiceLimit { limit: 2 })
        );
        e.set_shots_choice(vec!["a".into(), "b".into()]).unwrap();
        e.set_num_shots(3).unwrap();
        assert!(e.current().shots_choice.is_empty());
    }

    #[test]
    fn flush_commits_and_revert_discards() {
        let mut e = editor();
        assert_eq!(e.flush(), Ok(None));

        e.set_select_by(ShotSelection::New).unwrap();
        let (name, options) = e.flush().unwrap().unwrap();
        assert_eq!(name, "fit.py");
        assert_eq!(options.select_by, ShotSelection::New);
        assert_eq!(e.saved().select_by, ShotSelection::New);
        assert!(!e.has_draft());

        e.set_select_by(ShotSelection::Modified).unwrap();
        assert_eq!(e.revert(), Some("fit.py".to_string()));
        assert_eq!(e.current().select_by, ShotSelection::New);
        assert_eq!(e.revert(), None);
    }

    #[test]
    fn switching_routine_discards_draft() {
        let mut e = editor();
        e.set_select_by(ShotSelection::Latest).unwrap();
        e.select_routine(Some("scan.py"));
        assert!(!e.has_draft());
        assert_eq!(e.routine(), Some("scan.py"));
        e.select_routine(None);
        assert_eq!(e.routine(), None);
    }
}
