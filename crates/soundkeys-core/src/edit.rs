// Soundkeys Edit Session
// Accumulates an in-progress binding and commits it in one step
//
// Lifecycle:
//   Closed -> Open(selecting) -> Open(key chosen) -> Committed|Cancelled -> Closed
//
// While Closed, key clicks still move the selection so the current binding
// can be browsed with `describe`.

use std::fmt;

use strum_macros::{AsRefStr, EnumIter, EnumString};

use crate::action::ActionKind;
use crate::key::KeyCode;
use crate::mapping::BindingTable;
use crate::modifier::ModifierSet;

/// Errors that refuse an edit-session transition
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("Edit session is not open")]
    NotOpen,

    #[error("No key selected")]
    NoKeySelected,

    #[error("A sound binding needs a file")]
    MissingSoundFile,
}

/// Action types offered while editing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum PendingKind {
    #[default]
    #[strum(serialize = "sound")]
    Sound,
    #[strum(serialize = "stopAll")]
    StopAll,
    #[strum(serialize = "stopLooping")]
    StopLooping,
}

impl fmt::Display for PendingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// The action being built
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingAction {
    pub kind: PendingKind,
    pub file: Option<String>,
    pub loopable: bool,
}

impl PendingAction {
    fn from_action(action: &ActionKind) -> Self {
        match action {
            ActionKind::PlaySound {
                file_path,
                loopable,
            } => Self {
                kind: PendingKind::Sound,
                file: Some(file_path.clone()),
                loopable: *loopable,
            },
            ActionKind::StopAll => Self {
                kind: PendingKind::StopAll,
                ..Self::default()
            },
            ActionKind::StopLooping => Self {
                kind: PendingKind::StopLooping,
                ..Self::default()
            },
            ActionKind::Clear => Self::default(),
        }
    }
}

/// Coarse session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Selecting,
    KeyChosen,
}

/// A validated edit, ready for [`apply_edit`](crate::mapping::apply_edit)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCommit {
    pub key: KeyCode,
    pub modifiers: ModifierSet,
    pub action: ActionKind,
}

/// Edit session state machine.
///
/// The session never touches the binding table itself; `save` and `clear`
/// hand back an [`EditCommit`] for the owner of the table to apply.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    open: bool,
    selected_key: Option<KeyCode>,
    selected_modifiers: ModifierSet,
    pending: Option<PendingAction>,
    /// Pending file was copied from the existing binding, not chosen
    file_seeded: bool,
    dirty: bool,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        match (self.open, &self.selected_key) {
            (false, _) => SessionState::Closed,
            (true, None) => SessionState::Selecting,
            (true, Some(_)) => SessionState::KeyChosen,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// True once the open session holds edits not yet committed
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn selected_key(&self) -> Option<&KeyCode> {
        self.selected_key.as_ref()
    }

    pub fn selected_modifiers(&self) -> &ModifierSet {
        &self.selected_modifiers
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    /// Handle a click on a key.
    ///
    /// Modifier keys toggle membership in the selected modifier set; any
    /// other key becomes the selected key without touching the modifiers.
    pub fn click_key(&mut self, key: &KeyCode) {
        match key.as_modifier() {
            Some(modifier) => {
                let now = self.selected_modifiers.toggle(modifier);
                log::trace!("Edit modifier {} {}", modifier, if now { "on" } else { "off" });
            }
            None => {
                log::trace!("Edit key '{}' selected", key);
                self.selected_key = Some(key.clone());
            }
        }

        if self.open {
            self.dirty = true;
            if self.file_seeded {
                if let Some(pending) = self.pending.as_mut() {
                    pending.file = None;
                }
                self.file_seeded = false;
            }
        }
    }

    /// Open the session on the current selection.
    ///
    /// The pending action starts from the binding that matches the selected
    /// key and modifiers exactly, or from a non-looping sound with no file.
    pub fn open(&mut self, table: &BindingTable) {
        let existing = self
            .selected_key
            .as_ref()
            .and_then(|key| table.find(key.as_str(), &self.selected_modifiers));

        match existing {
            Some(binding) => {
                self.pending = Some(PendingAction::from_action(&binding.action));
                self.file_seeded = binding.action.file_path().is_some();
            }
            None => {
                self.pending = Some(PendingAction::default());
                self.file_seeded = false;
            }
        }
        self.open = true;
        self.dirty = false;
        log::debug!("Edit session opened");
    }

    /// Select the action type; non-sound types drop any file and loop flag
    pub fn set_kind(&mut self, kind: PendingKind) -> Result<(), EditError> {
        let pending = self.pending_mut()?;
        pending.kind = kind;
        if kind != PendingKind::Sound {
            pending.file = None;
            pending.loopable = false;
            self.file_seeded = false;
        }
        self.dirty = true;
        Ok(())
    }

    /// Choose the sound file; `None` mirrors an empty file-chooser selection.
    ///
    /// Ignored unless the pending kind is a sound.
    pub fn select_file(&mut self, file: Option<String>) -> Result<(), EditError> {
        let pending = self.pending_mut()?;
        if pending.kind != PendingKind::Sound {
            log::debug!("File selection ignored for {}", pending.kind);
            return Ok(());
        }
        pending.file = file.filter(|f| !f.is_empty());
        self.file_seeded = false;
        self.dirty = true;
        Ok(())
    }

    /// Set the loop flag; ignored unless the pending kind is a sound
    pub fn set_loopable(&mut self, loopable: bool) -> Result<(), EditError> {
        let pending = self.pending_mut()?;
        if pending.kind == PendingKind::Sound {
            pending.loopable = loopable;
            self.dirty = true;
        }
        Ok(())
    }

    fn pending_mut(&mut self) -> Result<&mut PendingAction, EditError> {
        if !self.open {
            return Err(EditError::NotOpen);
        }
        Ok(self.pending.get_or_insert_with(PendingAction::default))
    }

    /// Validate the pending edit and close the session.
    ///
    /// A sound needs either a newly chosen file or the file of the existing
    /// binding for exactly this key and modifier set. On error the session
    /// stays open and nothing is returned for commit.
    pub fn save(&mut self, table: &BindingTable) -> Result<EditCommit, EditError> {
        if !self.open {
            return Err(EditError::NotOpen);
        }
        let key = self.selected_key.clone().ok_or(EditError::NoKeySelected)?;
        let pending = self.pending.clone().unwrap_or_default();

        let action = match pending.kind {
            PendingKind::Sound => {
                let file = pending
                    .file
                    .or_else(|| {
                        table
                            .find(key.as_str(), &self.selected_modifiers)
                            .and_then(|b| b.action.file_path())
                            .map(str::to_string)
                    })
                    .ok_or(EditError::MissingSoundFile)?;
                ActionKind::sound(file, pending.loopable)
            }
            PendingKind::StopAll => ActionKind::StopAll,
            PendingKind::StopLooping => ActionKind::StopLooping,
        };

        let commit = EditCommit {
            key,
            modifiers: self.selected_modifiers.clone(),
            action,
        };
        self.reset();
        Ok(commit)
    }

    /// Remove the binding under the selection and close the session
    pub fn clear(&mut self) -> Result<EditCommit, EditError> {
        if !self.open {
            return Err(EditError::NotOpen);
        }
        let key = self.selected_key.clone().ok_or(EditError::NoKeySelected)?;
        let commit = EditCommit {
            key,
            modifiers: self.selected_modifiers.clone(),
            action: ActionKind::Clear,
        };
        self.reset();
        Ok(commit)
    }

    /// Discard every pending field without touching the table
    pub fn cancel(&mut self) {
        if self.open {
            log::debug!("Edit session cancelled");
        }
        self.reset();
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Summary of the binding under the current selection
    pub fn describe(&self, table: &BindingTable) -> String {
        let Some(key) = &self.selected_key else {
            return "Select a key to see its config".to_string();
        };
        match table.find(key.as_str(), &self.selected_modifiers) {
            Some(binding) => binding.action.to_string(),
            None => "No config".to_string(),
        }
    }
}
