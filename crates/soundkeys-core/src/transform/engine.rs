// Soundkeys Dispatcher
// Executes the action bound to a key-down event
//
// Pipeline per event:
// - drop events whose key is itself a modifier
// - apply the capslock policy to the live modifier set
// - resolve against the current binding table snapshot
// - call the audio service and update the loop tracker

use std::sync::Arc;

use crate::action::ActionKind;
use crate::key::KeyCode;
use crate::mapping::BindingTable;
use crate::modifier::{CapsLockPolicy, ModifierSet};
use crate::output::{AudioError, AudioService};
use crate::state::{LoopToken, LoopTracker};
use crate::transform::resolver::resolve;

/// Outcome of a handled key-down event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// The key is a modifier; modifier presses never trigger actions
    ModifierKey,
    /// Nothing bound to this key and modifier set
    Unbound,
    /// A one-shot sound was started
    Played(String),
    /// A loop was toggled on
    LoopStarted(LoopToken),
    /// A loop was toggled off
    LoopStopped(LoopToken),
    /// Every sound was stopped
    StoppedAll,
    /// Every looping sound was stopped
    StoppedLooping,
}

/// Resolves key events and drives the audio service.
///
/// The dispatcher holds a shared snapshot of the binding table and is the
/// only mutator of the active-loop set. New snapshots replace the old one
/// wholesale through [`Dispatcher::update_table`].
pub struct Dispatcher<A: AudioService> {
    table: Arc<BindingTable>,
    loops: LoopTracker,
    audio: A,
    capslock: CapsLockPolicy,
}

impl<A: AudioService> Dispatcher<A> {
    /// Create a dispatcher over a table snapshot
    pub fn new(table: Arc<BindingTable>, audio: A) -> Self {
        Self {
            table,
            loops: LoopTracker::new(),
            audio,
            capslock: CapsLockPolicy::default(),
        }
    }

    /// Builder-style capslock policy
    pub fn with_capslock_policy(mut self, policy: CapsLockPolicy) -> Self {
        self.capslock = policy;
        self
    }

    pub fn set_capslock_policy(&mut self, policy: CapsLockPolicy) {
        self.capslock = policy;
    }

    pub fn capslock_policy(&self) -> CapsLockPolicy {
        self.capslock
    }

    /// Current table snapshot
    pub fn table(&self) -> &Arc<BindingTable> {
        &self.table
    }

    /// Active loops, for diagnostics
    pub fn loops(&self) -> &LoopTracker {
        &self.loops
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    /// Replace the table snapshot.
    ///
    /// Loops whose binding is no longer the same looping sound are stopped
    /// by their recorded file path and forgotten.
    pub fn update_table(&mut self, table: Arc<BindingTable>) {
        let stale: Vec<LoopToken> = self
            .loops
            .iter()
            .filter(|(token, path)| !still_loops(&table, token, path))
            .map(|(token, _)| token.clone())
            .collect();

        for token in stale {
            if let Some(path) = self.loops.remove(&token) {
                match self.audio.stop_repeating(&path) {
                    Ok(()) => log::info!("Stopped orphaned loop {} ({})", token, path),
                    Err(e) => log::warn!("Failed to stop orphaned loop {}: {}", token, e),
                }
            }
        }

        self.table = table;
        log::debug!(
            "Dispatcher table updated: {} keys, {} active loops",
            self.table.len(),
            self.loops.len()
        );
    }

    /// Handle one key-down event.
    ///
    /// Audio failures are logged and returned; loop state stays consistent:
    /// a failed start registers nothing, a failed stop still forgets the loop.
    pub fn handle_key_down(
        &mut self,
        key: &KeyCode,
        modifiers: &ModifierSet,
    ) -> Result<Dispatched, AudioError> {
        if key.is_modifier() {
            return Ok(Dispatched::ModifierKey);
        }

        let modifiers = self.capslock.apply(modifiers);
        let table = Arc::clone(&self.table);
        let Some(action) = resolve(&table, key.as_str(), &modifiers) else {
            return Ok(Dispatched::Unbound);
        };

        log::debug!("Key '{}' [{}] -> {}", key, modifiers, action.type_name());
        let result = match action {
            ActionKind::PlaySound {
                file_path,
                loopable: false,
            } => self
                .audio
                .play(file_path)
                .map(|()| Dispatched::Played(file_path.clone())),
            ActionKind::PlaySound {
                file_path,
                loopable: true,
            } => self.toggle_loop(LoopToken::new(key.clone(), modifiers), file_path),
            ActionKind::StopAll => {
                let result = self.audio.stop_all();
                self.loops.clear();
                result.map(|()| Dispatched::StoppedAll)
            }
            ActionKind::StopLooping => {
                let result = self.audio.stop_all_repeating();
                self.loops.clear();
                result.map(|()| Dispatched::StoppedLooping)
            }
            ActionKind::Clear => Ok(Dispatched::Unbound),
        };

        if let Err(e) = &result {
            log::warn!("Audio call failed for key '{}': {}", key, e);
        }
        result
    }

    fn toggle_loop(&mut self, token: LoopToken, file_path: &str) -> Result<Dispatched, AudioError> {
        if let Some(playing) = self.loops.remove(&token) {
            self.audio.stop_repeating(&playing)?;
            log::info!("Loop off: {}", token);
            return Ok(Dispatched::LoopStopped(token));
        }

        self.audio.play_looping(file_path)?;
        log::info!("Loop on: {}", token);
        self.loops.insert(token.clone(), file_path);
        Ok(Dispatched::LoopStarted(token))
    }

    /// Stop every sound and forget all loops
    pub fn stop_all(&mut self) -> Result<(), AudioError> {
        self.loops.clear();
        self.audio.stop_all()
    }
}

fn still_loops(table: &BindingTable, token: &LoopToken, path: &str) -> bool {
    matches!(
        resolve(table, token.key.as_str(), &token.modifiers),
        Some(ActionKind::PlaySound { file_path, loopable: true }) if file_path == path
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::apply_edit;
    use crate::modifier::Modifier;

    #[derive(Debug, Default)]
    struct RecordingAudio {
        calls: Vec<String>,
        fail_next: Option<AudioError>,
    }

    impl RecordingAudio {
        fn record(&mut self, call: String) -> Result<(), AudioError> {
            self.calls.push(call);
            match self.fail_next.take() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }
    }

    impl AudioService for RecordingAudio {
        fn play(&mut self, path: &str) -> Result<(), AudioError> {
            self.record(format!("play {}", path))
        }
        fn play_looping(&mut self, path: &str) -> Result<(), AudioError> {
            self.record(format!("play_looping {}", path))
        }
        fn stop_repeating(&mut self, path: &str) -> Result<(), AudioError> {
            self.record(format!("stop_repeating {}", path))
        }
        fn stop_all_repeating(&mut self) -> Result<(), AudioError> {
            self.record("stop_all_repeating".to_string())
        }
        fn stop_all(&mut self) -> Result<(), AudioError> {
            self.record("stop_all".to_string())
        }
    }

    fn table_with(entries: &[(&str, ModifierSet, ActionKind)]) -> Arc<BindingTable> {
        let mut table = BindingTable::new();
        for (key, modifiers, action) in entries {
            table = apply_edit(&table, &KeyCode::from(*key), modifiers, action.clone()).0;
        }
        Arc::new(table)
    }

    fn none() -> ModifierSet {
        ModifierSet::new()
    }

    #[test]
    fn test_dispatch_one_shot_sound() {
        let table = table_with(&[("a", none(), ActionKind::sound("x.wav", false))]);
        let mut dispatcher = Dispatcher::new(table, RecordingAudio::default());

        let result = dispatcher.handle_key_down(&KeyCode::from("a"), &none());
        assert_eq!(result, Ok(Dispatched::Played("x.wav".to_string())));
        assert_eq!(dispatcher.audio().calls, vec!["play x.wav"]);
        assert!(dispatcher.loops().is_empty());
    }

    #[test]
    fn test_dispatch_ignores_modifier_keys() {
        let table = table_with(&[("shift", none(), ActionKind::StopAll)]);
        let mut dispatcher = Dispatcher::new(table, RecordingAudio::default());
        let result = dispatcher.handle_key_down(&KeyCode::from("shift"), &none());
        assert_eq!(result, Ok(Dispatched::ModifierKey));
        assert!(dispatcher.audio().calls.is_empty());
    }

    #[test]
    fn test_dispatch_unbound_is_inert() {
        let mut dispatcher = Dispatcher::new(Arc::new(BindingTable::new()), RecordingAudio::default());
        let result = dispatcher.handle_key_down(&KeyCode::from("z"), &none());
        assert_eq!(result, Ok(Dispatched::Unbound));
        assert!(dispatcher.audio().calls.is_empty());
    }

    #[test]
    fn test_loop_toggle_pairing() {
        let alt = ModifierSet::from([Modifier::Alt]);
        let table = table_with(&[("k", alt.clone(), ActionKind::sound("rain.wav", true))]);
        let mut dispatcher = Dispatcher::new(table, RecordingAudio::default());
        let key = KeyCode::from("k");
        let token = LoopToken::new(key.clone(), alt.clone());

        assert_eq!(
            dispatcher.handle_key_down(&key, &alt),
            Ok(Dispatched::LoopStarted(token.clone()))
        );
        assert!(dispatcher.loops().contains(&token));

        assert_eq!(
            dispatcher.handle_key_down(&key, &alt),
            Ok(Dispatched::LoopStopped(token.clone()))
        );
        assert!(!dispatcher.loops().contains(&token));
        assert_eq!(
            dispatcher.audio().calls,
            vec!["play_looping rain.wav", "stop_repeating rain.wav"]
        );
    }

    #[test]
    fn test_stop_all_clears_loops() {
        let shift = ModifierSet::from([Modifier::Shift]);
        let table = table_with(&[
            ("k1", none(), ActionKind::sound("a.wav", true)),
            ("k2", ModifierSet::from([Modifier::Alt]), ActionKind::sound("b.wav", true)),
            ("space", shift.clone(), ActionKind::StopAll),
        ]);
        let mut dispatcher = Dispatcher::new(table, RecordingAudio::default());
        dispatcher.handle_key_down(&KeyCode::from("k1"), &none()).unwrap();
        dispatcher
            .handle_key_down(&KeyCode::from("k2"), &ModifierSet::from([Modifier::Alt]))
            .unwrap();
        assert_eq!(dispatcher.loops().len(), 2);

        let result = dispatcher.handle_key_down(&KeyCode::from("space"), &shift);
        assert_eq!(result, Ok(Dispatched::StoppedAll));
        assert!(dispatcher.loops().is_empty());
        assert_eq!(
            dispatcher.audio().calls.iter().filter(|c| *c == "stop_all").count(),
            1
        );
    }

    #[test]
    fn test_stop_looping_clears_loops() {
        let table = table_with(&[
            ("k", none(), ActionKind::sound("a.wav", true)),
            ("s", none(), ActionKind::StopLooping),
        ]);
        let mut dispatcher = Dispatcher::new(table, RecordingAudio::default());
        dispatcher.handle_key_down(&KeyCode::from("k"), &none()).unwrap();
        let result = dispatcher.handle_key_down(&KeyCode::from("s"), &none());
        assert_eq!(result, Ok(Dispatched::StoppedLooping));
        assert!(dispatcher.loops().is_empty());
        assert_eq!(dispatcher.audio().calls.last().unwrap(), "stop_all_repeating");
    }

    #[test]
    fn test_failed_loop_start_registers_nothing() {
        let table = table_with(&[("k", none(), ActionKind::sound("missing.wav", true))]);
        let mut audio = RecordingAudio::default();
        audio.fail_next = Some(AudioError::NotFound("missing.wav".to_string()));
        let mut dispatcher = Dispatcher::new(table, audio);

        let result = dispatcher.handle_key_down(&KeyCode::from("k"), &none());
        assert_eq!(result, Err(AudioError::NotFound("missing.wav".to_string())));
        assert!(dispatcher.loops().is_empty());
    }

    #[test]
    fn test_failed_loop_stop_still_removes_token() {
        let table = table_with(&[("k", none(), ActionKind::sound("a.wav", true))]);
        let mut dispatcher = Dispatcher::new(table, RecordingAudio::default());
        let key = KeyCode::from("k");
        dispatcher.handle_key_down(&key, &none()).unwrap();

        dispatcher.audio_mut().fail_next =
            Some(AudioError::InvalidParameter("gone".to_string()));
        assert!(dispatcher.handle_key_down(&key, &none()).is_err());
        assert!(dispatcher.loops().is_empty());
    }

    #[test]
    fn test_capslock_policy_ignore() {
        let table = table_with(&[("a", none(), ActionKind::sound("x.wav", false))]);
        let caps = ModifierSet::from([Modifier::CapsLock]);

        let mut distinct = Dispatcher::new(Arc::clone(&table), RecordingAudio::default());
        assert_eq!(
            distinct.handle_key_down(&KeyCode::from("a"), &caps),
            Ok(Dispatched::Unbound)
        );

        let mut ignoring = Dispatcher::new(table, RecordingAudio::default())
            .with_capslock_policy(CapsLockPolicy::Ignore);
        assert_eq!(
            ignoring.handle_key_down(&KeyCode::from("a"), &caps),
            Ok(Dispatched::Played("x.wav".to_string()))
        );
    }

    #[test]
    fn test_update_table_stops_orphaned_loops() {
        let key = KeyCode::from("k");
        let table = table_with(&[
            ("k", none(), ActionKind::sound("a.wav", true)),
            ("j", none(), ActionKind::sound("b.wav", true)),
        ]);
        let mut dispatcher = Dispatcher::new(Arc::clone(&table), RecordingAudio::default());
        dispatcher.handle_key_down(&key, &none()).unwrap();
        dispatcher.handle_key_down(&KeyCode::from("j"), &none()).unwrap();

        let (cleared, _) = apply_edit(&table, &key, &none(), ActionKind::Clear);
        dispatcher.update_table(Arc::new(cleared));

        assert_eq!(dispatcher.loops().len(), 1);
        assert!(dispatcher
            .audio()
            .calls
            .contains(&"stop_repeating a.wav".to_string()));
        assert!(!dispatcher.table().contains_key("k"));
    }

    #[test]
    fn test_update_table_keeps_unchanged_loops() {
        let key = KeyCode::from("k");
        let table = table_with(&[("k", none(), ActionKind::sound("a.wav", true))]);
        let mut dispatcher = Dispatcher::new(Arc::clone(&table), RecordingAudio::default());
        dispatcher.handle_key_down(&key, &none()).unwrap();

        let (more, _) = apply_edit(&table, &KeyCode::from("x"), &none(), ActionKind::StopAll);
        dispatcher.update_table(Arc::new(more));
        assert_eq!(dispatcher.loops().len(), 1);
        assert_eq!(dispatcher.audio().calls, vec!["play_looping a.wav"]);
    }

    #[test]
    fn test_stop_all_on_shutdown() {
        let table = table_with(&[("k", none(), ActionKind::sound("a.wav", true))]);
        let mut dispatcher = Dispatcher::new(table, RecordingAudio::default());
        dispatcher.handle_key_down(&KeyCode::from("k"), &none()).unwrap();
        dispatcher.stop_all().unwrap();
        assert!(dispatcher.loops().is_empty());
        assert_eq!(dispatcher.audio().calls.last().unwrap(), "stop_all");
    }
}
