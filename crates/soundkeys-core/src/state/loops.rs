// Soundkeys Loop Tracker
// Set of key combinations currently producing a looping sound

use std::fmt;

use indexmap::IndexMap;

use crate::key::KeyCode;
use crate::modifier::ModifierSet;

/// Identity of one active loop: the key and modifiers that started it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoopToken {
    pub key: KeyCode,
    pub modifiers: ModifierSet,
}

impl LoopToken {
    pub fn new(key: KeyCode, modifiers: ModifierSet) -> Self {
        Self { key, modifiers }
    }
}

impl fmt::Display for LoopToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key)
        }
    }
}

/// Active loops, unique by token.
///
/// Each token remembers the file path it started so the sound can be
/// stopped by path even after its binding was edited or cleared.
#[derive(Debug, Clone, Default)]
pub struct LoopTracker {
    active: IndexMap<LoopToken, String>,
}

impl LoopTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self {
            active: IndexMap::new(),
        }
    }

    /// Record a started loop; returns false if the token was already active
    pub fn insert(&mut self, token: LoopToken, file_path: impl Into<String>) -> bool {
        if self.active.contains_key(&token) {
            return false;
        }
        self.active.insert(token, file_path.into());
        true
    }

    /// Forget a loop, returning the file path it was playing
    pub fn remove(&mut self, token: &LoopToken) -> Option<String> {
        self.active.shift_remove(token)
    }

    pub fn contains(&self, token: &LoopToken) -> bool {
        self.active.contains_key(token)
    }

    /// File path playing for a token
    pub fn file_path(&self, token: &LoopToken) -> Option<&str> {
        self.active.get(token).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Iterate over active tokens and their file paths in start order
    pub fn iter(&self) -> impl Iterator<Item = (&LoopToken, &str)> {
        self.active.iter().map(|(t, p)| (t, p.as_str()))
    }

    /// Snapshot of active tokens in start order, for diagnostics
    pub fn to_list(&self) -> Vec<LoopToken> {
        self.active.keys().cloned().collect()
    }
}
