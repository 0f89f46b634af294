// Soundkeys Headless Audio Backend
// Validates sound files and tracks playback without producing sound

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use indexmap::IndexMap;

use super::{AudioError, AudioService};

/// Audio service that checks files and logs playback.
///
/// Sound files must be RIFF/WAVE. With `verify_files` off (dry runs) any
/// path is accepted. Repeating sounds are tracked so stop calls behave
/// like a real engine: stopping a path that is not looping is an error.
/// Each path counts how many loops are playing it, so two loops on the
/// same file need two stops.
#[derive(Debug, Clone)]
pub struct HeadlessAudio {
    verify_files: bool,
    looping: IndexMap<String, usize>,
}

impl Default for HeadlessAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessAudio {
    /// Create a backend that validates every file it is asked to play
    pub fn new() -> Self {
        Self {
            verify_files: true,
            looping: IndexMap::new(),
        }
    }

    /// Create a backend that accepts any path
    pub fn dry_run() -> Self {
        Self {
            verify_files: false,
            looping: IndexMap::new(),
        }
    }

    /// Paths currently repeating
    pub fn looping(&self) -> impl Iterator<Item = &str> {
        self.looping.keys().map(String::as_str)
    }

    fn check(&self, path: &str) -> Result<(), AudioError> {
        if path.is_empty() {
            return Err(AudioError::InvalidParameter("empty sound path".to_string()));
        }
        if self.verify_files {
            check_wave_header(Path::new(path))?;
        }
        Ok(())
    }
}

/// Check that a file exists and starts with a RIFF/WAVE header
fn check_wave_header(path: &Path) -> Result<(), AudioError> {
    let display = path.display().to_string();
    let mut file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AudioError::NotFound(display.clone()),
        _ => AudioError::Unreadable {
            path: display.clone(),
            reason: e.to_string(),
        },
    })?;

    let mut header = [0u8; 12];
    file.read_exact(&mut header)
        .map_err(|_| AudioError::Malformed {
            path: display.clone(),
            reason: "file too short for a WAVE header".to_string(),
        })?;

    if &header[0..4] != b"RIFF" || &header[8..12] != b"WAVE" {
        return Err(AudioError::Malformed {
            path: display,
            reason: "not a RIFF/WAVE file".to_string(),
        });
    }
    Ok(())
}

impl AudioService for HeadlessAudio {
    fn play(&mut self, path: &str) -> Result<(), AudioError> {
        self.check(path)?;
        log::info!("Playing {}", path);
        Ok(())
    }

    fn play_looping(&mut self, path: &str) -> Result<(), AudioError> {
        self.check(path)?;
        *self.looping.entry(path.to_string()).or_insert(0) += 1;
        log::info!("Looping {}", path);
        Ok(())
    }

    fn stop_repeating(&mut self, path: &str) -> Result<(), AudioError> {
        let Some(count) = self.looping.get_mut(path) else {
            return Err(AudioError::InvalidParameter(format!(
                "'{}' is not looping",
                path
            )));
        };
        *count -= 1;
        if *count == 0 {
            self.looping.shift_remove(path);
        }
        log::info!("Stopped loop {}", path);
        Ok(())
    }

    fn stop_all_repeating(&mut self) -> Result<(), AudioError> {
        log::info!("Stopping {} looping sound(s)", self.looping.len());
        self.looping.clear();
        Ok(())
    }

    fn stop_all(&mut self) -> Result<(), AudioError> {
        log::info!("Stopping all sounds");
        self.looping.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> String {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_headless_plays_wave_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "ok.wav", b"RIFF\x24\x00\x00\x00WAVEfmt ");
        let mut audio = HeadlessAudio::new();
        assert_eq!(audio.play(&path), Ok(()));
        assert_eq!(audio.play_looping(&path), Ok(()));
        assert_eq!(audio.looping().collect::<Vec<_>>(), vec![path.as_str()]);
    }

    #[test]
    fn test_headless_missing_file() {
        let mut audio = HeadlessAudio::new();
        assert!(matches!(
            audio.play("/definitely/not/here.wav"),
            Err(AudioError::NotFound(_))
        ));
    }

    #[test]
    fn test_headless_rejects_non_wave() {
        let dir = tempfile::tempdir().unwrap();
        let short = write_file(dir.path(), "short.wav", b"RIFF");
        let mp3 = write_file(dir.path(), "song.wav", b"ID3\x03\x00\x00\x00\x00\x00\x00\x00\x00");
        let mut audio = HeadlessAudio::new();
        assert!(matches!(audio.play(&short), Err(AudioError::Malformed { .. })));
        assert!(matches!(
            audio.play_looping(&mp3),
            Err(AudioError::Malformed { .. })
        ));
        assert_eq!(audio.looping().count(), 0);
    }

    #[test]
    fn test_headless_stop_repeating_requires_loop() {
        let mut audio = HeadlessAudio::dry_run();
        assert!(matches!(
            audio.stop_repeating("a.wav"),
            Err(AudioError::InvalidParameter(_))
        ));
        audio.play_looping("a.wav").unwrap();
        assert_eq!(audio.stop_repeating("a.wav"), Ok(()));
    }

    #[test]
    fn test_headless_same_file_looped_twice() {
        let mut audio = HeadlessAudio::dry_run();
        audio.play_looping("rain.wav").unwrap();
        audio.play_looping("rain.wav").unwrap();

        assert_eq!(audio.stop_repeating("rain.wav"), Ok(()));
        assert_eq!(audio.looping().collect::<Vec<_>>(), vec!["rain.wav"]);
        assert_eq!(audio.stop_repeating("rain.wav"), Ok(()));
        assert_eq!(audio.looping().count(), 0);
    }

    #[test]
    fn test_headless_stop_all_clears_loops() {
        let mut audio = HeadlessAudio::dry_run();
        audio.play_looping("a.wav").unwrap();
        audio.play_looping("b.wav").unwrap();
        audio.stop_all_repeating().unwrap();
        assert_eq!(audio.looping().count(), 0);

        audio.play_looping("a.wav").unwrap();
        audio.stop_all().unwrap();
        assert_eq!(audio.looping().count(), 0);
    }

    #[test]
    fn test_headless_rejects_empty_path() {
        let mut audio = HeadlessAudio::dry_run();
        assert!(matches!(audio.play(""), Err(AudioError::InvalidParameter(_))));
    }
}
