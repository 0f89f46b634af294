// Soundkeys Input Layer
// Validation of key events arriving from the key hook

mod chord;
mod event;

pub use chord::parse_chord;
pub use event::{InputError, KeyEvent, RawKeyEvent};
