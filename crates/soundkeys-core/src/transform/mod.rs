// Soundkeys Transform Module
// Turns key events into actions and audio calls

pub mod engine;
pub mod resolver;

pub use engine::{Dispatched, Dispatcher};
pub use resolver::resolve;
