// Soundkeys Modifier System
// Closed set of modifier keys and order-independent modifier sets

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

/// Represents a keyboard modifier, such as Shift or Ctrl.
///
/// The vocabulary is closed: names coming from the key hook or from a
/// config file must map onto one of these variants or be rejected. The
/// first name listed for each variant is the canonical one written to
/// config files; the rest are accepted aliases.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Modifier {
    #[strum(to_string = "shift", serialize = "lshift")]
    Shift,
    #[strum(to_string = "rshift")]
    RShift,
    #[strum(to_string = "ctrl", serialize = "control")]
    Ctrl,
    #[strum(to_string = "lctrl")]
    LCtrl,
    #[strum(to_string = "rctrl")]
    RCtrl,
    #[strum(to_string = "alt", serialize = "lalt", serialize = "option")]
    Alt,
    #[strum(to_string = "alt-gr", serialize = "altgr", serialize = "ralt")]
    AltGr,
    #[strum(
        to_string = "meta",
        serialize = "super",
        serialize = "command",
        serialize = "cmd",
        serialize = "win"
    )]
    Meta,
    #[strum(to_string = "capslock", serialize = "caps lock", serialize = "caps_lock")]
    CapsLock,
}

impl Modifier {
    /// Canonical name, as written to config files
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Get modifier by name or alias
    pub fn from_name(name: &str) -> Result<Modifier, ModifierError> {
        Modifier::from_str(name.trim()).map_err(|_| ModifierError::Unknown(name.to_string()))
    }

    /// Get the modifier a key name stands for, if any
    pub fn from_key_name(key_name: &str) -> Option<Modifier> {
        Modifier::from_str(key_name).ok()
    }

    /// All modifiers in canonical order
    pub fn all() -> impl Iterator<Item = Modifier> {
        Modifier::iter()
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Modifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Modifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Modifier::from_name(&name).map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when working with modifiers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModifierError {
    #[error("unknown modifier '{0}'")]
    Unknown(String),
}

/// Unordered set of modifiers, compared by membership only
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierSet(BTreeSet<Modifier>);

impl ModifierSet {
    /// Create an empty modifier set
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Build a set from raw modifier names, rejecting unknown names
    pub fn parse_names<I, S>(names: I) -> Result<Self, ModifierError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| Modifier::from_name(name.as_ref()))
            .collect()
    }

    /// Add a modifier; returns false if it was already present
    pub fn insert(&mut self, modifier: Modifier) -> bool {
        self.0.insert(modifier)
    }

    /// Remove a modifier; returns false if it was absent
    pub fn remove(&mut self, modifier: Modifier) -> bool {
        self.0.remove(&modifier)
    }

    /// Flip membership of a modifier; returns true if it is now present
    pub fn toggle(&mut self, modifier: Modifier) -> bool {
        if self.0.remove(&modifier) {
            false
        } else {
            self.0.insert(modifier);
            true
        }
    }

    pub fn contains(&self, modifier: Modifier) -> bool {
        self.0.contains(&modifier)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = Modifier> + '_ {
        self.0.iter().copied()
    }

    /// Canonical names in a stable order
    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|m| m.name()).collect()
    }

    /// Copy of this set with one modifier removed
    pub fn without(&self, modifier: Modifier) -> Self {
        let mut set = self.clone();
        set.remove(modifier);
        set
    }
}

impl FromIterator<Modifier> for ModifierSet {
    fn from_iter<T: IntoIterator<Item = Modifier>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Modifier; N]> for ModifierSet {
    fn from(modifiers: [Modifier; N]) -> Self {
        modifiers.into_iter().collect()
    }
}

impl fmt::Display for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join("+"))
    }
}

/// How capslock takes part in binding resolution.
///
/// `Distinct` treats capslock as a real modifier, so `a` and `capslock+a`
/// resolve to different bindings. `Ignore` strips it from live key events
/// before resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapsLockPolicy {
    #[default]
    Distinct,
    Ignore,
}

impl CapsLockPolicy {
    /// Apply the policy to a live modifier set
    pub fn apply(self, modifiers: &ModifierSet) -> ModifierSet {
        match self {
            CapsLockPolicy::Distinct => modifiers.clone(),
            CapsLockPolicy::Ignore => modifiers.without(Modifier::CapsLock),
        }
    }
}
