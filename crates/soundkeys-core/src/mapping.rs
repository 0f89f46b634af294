// Soundkeys Mapping Structures
// Binding, BindingTable and the single mutation entry point

use indexmap::IndexMap;

use crate::action::ActionKind;
use crate::key::KeyCode;
use crate::modifier::ModifierSet;

/// Association between a modifier set and an action for one key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binding {
    pub modifiers: ModifierSet,
    pub action: ActionKind,
}

impl Binding {
    pub fn new(modifiers: ModifierSet, action: ActionKind) -> Self {
        Self { modifiers, action }
    }
}

/// Mapping from key identity to the bindings defined for that key.
///
/// Invariants:
/// - every key present maps to a non-empty list
/// - no two bindings for the same key have equal modifier sets
/// - `ActionKind::Clear` is never stored
///
/// Keys keep their insertion order so serialization is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingTable {
    keys: IndexMap<KeyCode, Vec<Binding>>,
}

impl BindingTable {
    /// Create an empty binding table
    pub fn new() -> Self {
        Self {
            keys: IndexMap::new(),
        }
    }

    /// Number of keys with at least one binding
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Total number of bindings across all keys
    pub fn binding_count(&self) -> usize {
        self.keys.values().map(Vec::len).sum()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// Bindings defined for a key
    pub fn get(&self, key: &str) -> Option<&[Binding]> {
        self.keys.get(key).map(Vec::as_slice)
    }

    /// The binding for a key whose modifier set equals `modifiers` exactly
    pub fn find(&self, key: &str, modifiers: &ModifierSet) -> Option<&Binding> {
        self.keys
            .get(key)?
            .iter()
            .find(|binding| &binding.modifiers == modifiers)
    }

    /// Iterate over keys and their bindings in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&KeyCode, &[Binding])> {
        self.keys.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &KeyCode> {
        self.keys.keys()
    }

    /// Apply one edit in place.
    ///
    /// Returns true if the table changed structurally.
    pub fn edit(&mut self, key: &KeyCode, modifiers: &ModifierSet, action: ActionKind) -> bool {
        let Some(bindings) = self.keys.get_mut(key.as_str()) else {
            if action.is_clear() {
                return false;
            }
            self.keys
                .insert(key.clone(), vec![Binding::new(modifiers.clone(), action)]);
            return true;
        };

        let position = bindings.iter().position(|b| &b.modifiers == modifiers);
        match (position, action.is_clear()) {
            (Some(index), true) => {
                bindings.remove(index);
                if bindings.is_empty() {
                    self.keys.shift_remove(key.as_str());
                }
                true
            }
            (Some(index), false) => {
                bindings[index].action = action;
                true
            }
            (None, false) => {
                bindings.push(Binding::new(modifiers.clone(), action));
                true
            }
            (None, true) => false,
        }
    }

    /// Append a binding while loading, keeping the first of any duplicates.
    ///
    /// Returns false if the key already had a binding with these modifiers.
    pub(crate) fn insert_loaded(&mut self, key: KeyCode, binding: Binding) -> bool {
        let bindings = self.keys.entry(key).or_default();
        if bindings.iter().any(|b| b.modifiers == binding.modifiers) {
            return false;
        }
        bindings.push(binding);
        true
    }
}

/// Commit one edit and return the resulting table.
///
/// The input table is left untouched; the whole structural change is
/// visible in the returned table or none of it is.
///
/// # Returns
/// The new table and whether it differs structurally from the input
pub fn apply_edit(
    table: &BindingTable,
    key: &KeyCode,
    modifiers: &ModifierSet,
    action: ActionKind,
) -> (BindingTable, bool) {
    let mut next = table.clone();
    let changed = next.edit(key, modifiers, action);
    if changed {
        log::debug!("Binding table edited: key='{}' modifiers=[{}]", key, modifiers);
    }
    (next, changed)
}
