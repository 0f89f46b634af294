// Soundkeys State Module
// Runtime playback state owned by the dispatcher

pub mod loops;

pub use loops::{LoopToken, LoopTracker};
