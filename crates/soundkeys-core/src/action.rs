use std::fmt;
use std::path::Path;

/// What a binding does when its key combination is pressed.
///
/// `Clear` is a pseudo-action: it is only ever passed to
/// [`apply_edit`](crate::mapping::apply_edit) to remove a binding and is
/// never stored in a [`BindingTable`](crate::mapping::BindingTable).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKind {
    PlaySound { file_path: String, loopable: bool },
    StopAll,
    StopLooping,
    Clear,
}

impl ActionKind {
    /// Shorthand for a sound action
    pub fn sound(file_path: impl Into<String>, loopable: bool) -> Self {
        ActionKind::PlaySound {
            file_path: file_path.into(),
            loopable,
        }
    }

    /// Name used for the `type` field of persisted records
    pub fn type_name(&self) -> &'static str {
        match self {
            ActionKind::PlaySound { .. } => "sound",
            ActionKind::StopAll => "stopAll",
            ActionKind::StopLooping => "stopLooping",
            ActionKind::Clear => "clear",
        }
    }

    /// Returns true for the `Clear` pseudo-action
    pub fn is_clear(&self) -> bool {
        matches!(self, ActionKind::Clear)
    }

    /// Returns true only for a sound that loops until toggled off
    pub fn is_loopable_sound(&self) -> bool {
        matches!(self, ActionKind::PlaySound { loopable: true, .. })
    }

    /// File path of a sound action
    pub fn file_path(&self) -> Option<&str> {
        match self {
            ActionKind::PlaySound { file_path, .. } => Some(file_path),
            _ => None,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::PlaySound {
                file_path,
                loopable,
            } => {
                let name = Path::new(file_path)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or(file_path);
                if *loopable {
                    write!(f, "{}    (looping)", name)
                } else {
                    write!(f, "{}", name)
                }
            }
            other => write!(f, "{}", other.type_name()),
        }
    }
}
