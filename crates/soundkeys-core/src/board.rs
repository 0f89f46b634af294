// Soundkeys Composition Root
// Owns the binding table and wires dispatcher, notifier and settings

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::action::ActionKind;
use crate::config::{self, ConfigError};
use crate::edit::{EditCommit, EditError, EditSession};
use crate::input::{InputError, KeyEvent, RawKeyEvent};
use crate::key::KeyCode;
use crate::mapping::{apply_edit, BindingTable};
use crate::modifier::ModifierSet;
use crate::notify::{EventName, Notification, Notifier};
use crate::output::{AudioError, AudioService};
use crate::settings::{Settings, SettingsError};
use crate::state::LoopToken;
use crate::transform::{Dispatched, Dispatcher};

/// Errors surfaced by [`Soundboard`] operations
#[derive(Debug, thiserror::Error)]
pub enum SoundboardError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Find the binding config to open at startup.
///
/// Precedence: an explicit path, then the last used config from the
/// settings if it still exists, then the first config found in the config
/// directory. The last case records the choice in `settings`.
pub fn locate_config(explicit: Option<&Path>, settings: &mut Settings) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Some(path) = settings.config_path() {
        if path.is_file() {
            return Ok(path);
        }
        log::warn!("Last used config {} no longer exists", path.display());
    }

    let dir = settings.resolved_config_dir();
    let first = config::list_configs(&dir)
        .ok()
        .and_then(|names| names.into_iter().next())
        .ok_or_else(|| ConfigError::NoConfig(format!("no config files in {}", dir.display())))?;

    log::info!("Using config {} from {}", first, dir.display());
    settings.set_last_used_config(Some(first.clone()));
    Ok(dir.join(first))
}

/// Application controller.
///
/// The soundboard holds the only authoritative [`BindingTable`]. Every
/// committed edit produces a new snapshot that is published as
/// `config_update`; the dispatcher is registered as the first subscriber
/// and swaps its snapshot wholesale.
pub struct Soundboard<A: AudioService> {
    table: Arc<BindingTable>,
    settings: Arc<Settings>,
    dispatcher: Arc<Mutex<Dispatcher<A>>>,
    notifier: Notifier,
    config_path: Option<PathBuf>,
    dirty: bool,
}

impl<A: AudioService + 'static> Soundboard<A> {
    /// Wire a soundboard around a table, settings and an audio backend
    pub fn new(table: BindingTable, settings: Settings, audio: A) -> Self {
        let table = Arc::new(table);
        let settings = Arc::new(settings);
        let dispatcher = Arc::new(Mutex::new(
            Dispatcher::new(Arc::clone(&table), audio).with_capslock_policy(settings.capslock()),
        ));

        let mut notifier = Notifier::new();
        {
            let dispatcher = Arc::clone(&dispatcher);
            notifier.subscribe(EventName::ConfigUpdate, move |notification| {
                if let Notification::ConfigUpdate(table) = notification {
                    dispatcher.lock().update_table(Arc::clone(table));
                }
            });
        }
        {
            let dispatcher = Arc::clone(&dispatcher);
            notifier.subscribe(EventName::SettingUpdate, move |notification| {
                if let Notification::SettingUpdate(settings) = notification {
                    dispatcher.lock().set_capslock_policy(settings.capslock());
                }
            });
        }

        Self {
            table,
            settings,
            dispatcher,
            notifier,
            config_path: None,
            dirty: false,
        }
    }

    /// Load the table from a config file and remember the path for writing
    pub fn load<P: AsRef<Path>>(path: P, settings: Settings, audio: A) -> Result<Self, ConfigError> {
        let table = config::load_path(&path)?;
        Ok(Self::new(table, settings, audio).with_config_path(path.as_ref()))
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Current table snapshot
    pub fn table(&self) -> &Arc<BindingTable> {
        &self.table
    }

    /// Current settings snapshot
    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// True if the table changed since it was loaded or written
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Register an extra subscriber after the dispatcher
    pub fn subscribe<F>(&mut self, name: EventName, callback: F)
    where
        F: FnMut(&Notification) + 'static,
    {
        self.notifier.subscribe(name, callback);
    }

    pub fn handle_key_down(
        &self,
        key: &KeyCode,
        modifiers: &ModifierSet,
    ) -> Result<Dispatched, AudioError> {
        self.dispatcher.lock().handle_key_down(key, modifiers)
    }

    pub fn handle_event(&self, event: &KeyEvent) -> Result<Dispatched, AudioError> {
        self.handle_key_down(&event.key, &event.modifiers)
    }

    /// Validate a raw key-hook event and dispatch it
    pub fn handle_raw(&self, raw: &RawKeyEvent) -> Result<Dispatched, SoundboardError> {
        let event = KeyEvent::from_raw(raw)?;
        Ok(self.handle_event(&event)?)
    }

    /// Apply one edit, publishing the new snapshot if anything changed
    pub fn apply(&mut self, key: &KeyCode, modifiers: &ModifierSet, action: ActionKind) -> bool {
        let (next, changed) = apply_edit(&self.table, key, modifiers, action);
        if changed {
            self.dirty = true;
            self.publish_table(next);
        }
        changed
    }

    /// Apply a validated edit-session commit
    pub fn commit(&mut self, commit: EditCommit) -> bool {
        self.apply(&commit.key, &commit.modifiers, commit.action)
    }

    /// Save the session's pending edit into the table
    pub fn save_edit(&mut self, session: &mut EditSession) -> Result<bool, EditError> {
        let commit = session.save(&self.table)?;
        Ok(self.commit(commit))
    }

    /// Clear the binding under the session's selection
    pub fn clear_edit(&mut self, session: &mut EditSession) -> Result<bool, EditError> {
        let commit = session.clear()?;
        Ok(self.commit(commit))
    }

    /// Switch to another config file.
    ///
    /// On a load failure the current table stays active. On success the
    /// file becomes the last used config in the settings, which are saved
    /// when they have a file and published as `setting_update`.
    pub fn open_config<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let table = config::load_path(path)?;
        if self.dirty {
            log::warn!("Discarding unsaved binding edits to open {}", path.display());
        }
        self.config_path = Some(path.to_path_buf());
        self.dirty = false;
        self.publish_table(table);
        self.remember_config(path);
        Ok(())
    }

    fn remember_config(&mut self, path: &Path) {
        let dir = self.settings.resolved_config_dir();
        let name = match path.strip_prefix(&dir) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => path.canonicalize().unwrap_or_else(|_| path.to_path_buf()),
        };

        let mut settings = Settings::clone(&self.settings);
        settings.set_last_used_config(Some(name.to_string_lossy().into_owned()));
        if settings.source_path().is_some() {
            if let Err(e) = settings.save_to_source() {
                log::warn!("Could not save settings: {}", e);
            }
        }
        self.update_settings(settings);
    }

    fn publish_table(&mut self, table: BindingTable) {
        self.table = Arc::new(table);
        self.notifier
            .publish(&Notification::ConfigUpdate(Arc::clone(&self.table)));
    }

    /// Write the table to its config path and clear the dirty flag
    pub fn write_config(&mut self) -> Result<(), ConfigError> {
        let path = self
            .config_path
            .as_ref()
            .ok_or_else(|| ConfigError::NoConfig("no config path set".to_string()))?;
        config::save_path(&self.table, path)?;
        self.dirty = false;
        Ok(())
    }

    /// Replace the settings snapshot and publish it
    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = Arc::new(settings);
        self.notifier
            .publish(&Notification::SettingUpdate(Arc::clone(&self.settings)));
    }

    /// Restore default settings, persisting them when the settings have a file
    pub fn reset_settings(&mut self) -> Result<(), SettingsError> {
        let mut settings = Settings::clone(&self.settings);
        settings.reset();
        if settings.source_path().is_some() {
            settings.save_to_source()?;
        }
        log::info!("Settings reset to defaults");
        self.update_settings(settings);
        Ok(())
    }

    /// Snapshot of the active loops
    pub fn active_loops(&self) -> Vec<LoopToken> {
        self.dispatcher.lock().loops().to_list()
    }

    /// Run a closure against the audio backend
    pub fn with_audio<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
        f(self.dispatcher.lock().audio_mut())
    }

    /// Stop every sound before the application exits
    pub fn shutdown(&self) -> Result<(), AudioError> {
        log::info!("Shutting down, stopping all sounds");
        self.dispatcher.lock().stop_all()
    }
}
