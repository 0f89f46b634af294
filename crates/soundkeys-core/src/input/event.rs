// Soundkeys Input Layer - Key Events
// Raw key-down events and their validated form

use serde::{Deserialize, Serialize};

use crate::key::KeyCode;
use crate::modifier::{ModifierError, ModifierSet};

/// Errors raised while validating input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),

    #[error("key name cannot be empty")]
    EmptyKey,

    #[error("chord cannot be empty")]
    EmptyChord,
}

impl From<ModifierError> for InputError {
    fn from(e: ModifierError) -> Self {
        match e {
            ModifierError::Unknown(name) => InputError::UnknownModifier(name),
        }
    }
}

/// Key-down event as delivered by the key hook: a key name plus the
/// names of the modifiers held at the time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawKeyEvent {
    pub key_code: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
}

impl RawKeyEvent {
    pub fn new<S: AsRef<str>>(key_code: impl Into<String>, modifiers: &[S]) -> Self {
        Self {
            key_code: key_code.into(),
            modifiers: modifiers.iter().map(|m| m.as_ref().to_string()).collect(),
        }
    }
}

/// Validated key-down event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub modifiers: ModifierSet,
}

impl KeyEvent {
    pub fn new(key: impl Into<KeyCode>, modifiers: ModifierSet) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    /// Validate a raw event.
    ///
    /// Modifier names must belong to the closed vocabulary; repeated names
    /// collapse into one set member.
    pub fn from_raw(raw: &RawKeyEvent) -> Result<Self, InputError> {
        if raw.key_code.is_empty() {
            return Err(InputError::EmptyKey);
        }
        let modifiers = ModifierSet::parse_names(&raw.modifiers)?;
        log::trace!("Key event '{}' [{}]", raw.key_code, modifiers);
        Ok(Self {
            key: KeyCode::new(raw.key_code.as_str()),
            modifiers,
        })
    }

    /// True if the pressed key is itself a modifier
    pub fn is_modifier_key(&self) -> bool {
        self.key.is_modifier()
    }
}

impl TryFrom<RawKeyEvent> for KeyEvent {
    type Error = InputError;

    fn try_from(raw: RawKeyEvent) -> Result<Self, Self::Error> {
        KeyEvent::from_raw(&raw)
    }
}
