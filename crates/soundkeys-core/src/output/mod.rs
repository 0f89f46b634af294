// Soundkeys Output Layer
// Seam to the external audio engine

mod headless;

pub use headless::HeadlessAudio;

/// Error types for audio service calls
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AudioError {
    #[error("Sound file not found: {0}")]
    NotFound(String),

    #[error("Sound file unreadable: {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Malformed audio data in {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("Invalid audio parameter: {0}")]
    InvalidParameter(String),
}

/// Playback operations the core needs from the audio engine.
///
/// Implementations are expected not to block; decoding and mixing happen
/// behind this trait.
pub trait AudioService {
    /// Play a sound once
    fn play(&mut self, path: &str) -> Result<(), AudioError>;

    /// Start a sound that repeats until stopped
    fn play_looping(&mut self, path: &str) -> Result<(), AudioError>;

    /// Stop the repeating sound started from `path`
    fn stop_repeating(&mut self, path: &str) -> Result<(), AudioError>;

    /// Stop every repeating sound, leaving one-shot sounds alone
    fn stop_all_repeating(&mut self) -> Result<(), AudioError>;

    /// Stop every sound
    fn stop_all(&mut self) -> Result<(), AudioError>;
}

impl<T: AudioService + ?Sized> AudioService for Box<T> {
    fn play(&mut self, path: &str) -> Result<(), AudioError> {
        (**self).play(path)
    }

    fn play_looping(&mut self, path: &str) -> Result<(), AudioError> {
        (**self).play_looping(path)
    }

    fn stop_repeating(&mut self, path: &str) -> Result<(), AudioError> {
        (**self).stop_repeating(path)
    }

    fn stop_all_repeating(&mut self) -> Result<(), AudioError> {
        (**self).stop_all_repeating()
    }

    fn stop_all(&mut self) -> Result<(), AudioError> {
        (**self).stop_all()
    }
}
