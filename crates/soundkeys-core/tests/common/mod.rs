// Shared test support: an audio service that records every call

#![allow(dead_code)]

use std::collections::HashSet;

use soundkeys_core::{AudioError, AudioService};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Play(String),
    PlayLooping(String),
    StopRepeating(String),
    StopAllRepeating,
    StopAll,
}

/// Records calls in order; paths listed in `missing` fail with `NotFound`
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub calls: Vec<Call>,
    pub missing: HashSet<String>,
    pub fail_stops: bool,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_missing(path: &str) -> Self {
        let mut audio = Self::new();
        audio.missing.insert(path.to_string());
        audio
    }

    pub fn count(&self, wanted: &Call) -> usize {
        self.calls.iter().filter(|c| *c == wanted).count()
    }

    fn start(&mut self, call: Call, path: &str) -> Result<(), AudioError> {
        self.calls.push(call);
        if self.missing.contains(path) {
            return Err(AudioError::NotFound(path.to_string()));
        }
        Ok(())
    }

    fn stop(&mut self, call: Call) -> Result<(), AudioError> {
        self.calls.push(call);
        if self.fail_stops {
            return Err(AudioError::InvalidParameter("stop failed".to_string()));
        }
        Ok(())
    }
}

impl AudioService for RecordingAudio {
    fn play(&mut self, path: &str) -> Result<(), AudioError> {
        self.start(Call::Play(path.to_string()), path)
    }

    fn play_looping(&mut self, path: &str) -> Result<(), AudioError> {
        self.start(Call::PlayLooping(path.to_string()), path)
    }

    fn stop_repeating(&mut self, path: &str) -> Result<(), AudioError> {
        self.stop(Call::StopRepeating(path.to_string()))
    }

    fn stop_all_repeating(&mut self) -> Result<(), AudioError> {
        self.stop(Call::StopAllRepeating)
    }

    fn stop_all(&mut self) -> Result<(), AudioError> {
        self.stop(Call::StopAll)
    }
}
