// Soundkeys Input Layer - Chord Parser
// Parses chord strings like "shift+ctrl+k" into key events

use super::event::{InputError, KeyEvent};
use crate::key::KeyCode;
use crate::modifier::{Modifier, ModifierSet};

/// Parse a chord string into a key event
///
/// The last `+`-separated part is the key, everything before it names
/// modifiers. A key that is itself `+` is written with a doubled
/// separator (`"shift++"`), or alone (`"+"`).
///
/// # Examples
/// ```
/// use soundkeys_core::input::parse_chord;
/// let event = parse_chord("shift+alt+k").unwrap();
/// assert_eq!(event.key.as_str(), "k");
/// assert_eq!(event.modifiers.len(), 2);
/// ```
pub fn parse_chord(chord: &str) -> Result<KeyEvent, InputError> {
    let trimmed = chord.trim();
    if trimmed.is_empty() {
        return Err(InputError::EmptyChord);
    }

    let (prefix, key) = if trimmed == "+" {
        ("", "+")
    } else if let Some(rest) = trimmed.strip_suffix("++") {
        (rest, "+")
    } else {
        match trimmed.rsplit_once('+') {
            Some((prefix, key)) => (prefix, key.trim()),
            None => ("", trimmed),
        }
    };

    if key.is_empty() {
        return Err(InputError::EmptyKey);
    }

    let mut modifiers = ModifierSet::new();
    for name in prefix.split('+').map(str::trim).filter(|n| !n.is_empty()) {
        modifiers.insert(Modifier::from_name(name)?);
    }

    Ok(KeyEvent::new(KeyCode::from(key), modifiers))
}
