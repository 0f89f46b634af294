// Soundkeys Key Type
// Opaque identity of a physical key as reported by the key hook

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::modifier::Modifier;

/// Represents a single keyboard key identity.
///
/// This is a newtype wrapper around the key name delivered by the keyboard
/// hook (e.g. `"a"`, `"space"`, `"f1"`, `"\\"`). The name is kept verbatim;
/// no case folding or normalization happens here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(String);

impl KeyCode {
    /// Create a key code from its name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the key name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the modifier this key stands for, if it is a modifier key
    pub fn as_modifier(&self) -> Option<Modifier> {
        Modifier::from_key_name(&self.0)
    }

    /// Check if this key is itself a modifier (shift, ctrl, capslock, ...)
    pub fn is_modifier(&self) -> bool {
        self.as_modifier().is_some()
    }

    /// Check if the key name is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for KeyCode {
    fn from(name: &str) -> Self {
        KeyCode(name.to_string())
    }
}

impl From<String> for KeyCode {
    fn from(name: String) -> Self {
        KeyCode(name)
    }
}

impl Borrow<str> for KeyCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for KeyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for KeyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("Empty key name".to_string());
        }
        Ok(KeyCode(s.to_string()))
    }
}
