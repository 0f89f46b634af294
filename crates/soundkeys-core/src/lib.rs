// Soundkeys Core Library
// Key-combination soundboard: bindings, resolution, loop state and editing

pub mod action;
pub mod board;
pub mod config;
pub mod edit;
pub mod input;
pub mod key;
pub mod mapping;
pub mod modifier;
pub mod notify;
pub mod output;
pub mod settings;
pub mod state;
pub mod transform;

pub use action::ActionKind;
pub use board::{locate_config, Soundboard, SoundboardError};
pub use config::{deserialize, list_configs, load_path, save_path, serialize, ConfigError};
pub use edit::{EditCommit, EditError, EditSession, PendingAction, PendingKind, SessionState};
pub use input::{parse_chord, InputError, KeyEvent, RawKeyEvent};
pub use key::KeyCode;
pub use mapping::{apply_edit, Binding, BindingTable};
pub use modifier::{CapsLockPolicy, Modifier, ModifierError, ModifierSet};
pub use notify::{EventName, Notification, Notifier};
pub use output::{AudioError, AudioService, HeadlessAudio};
pub use settings::{Settings, SettingsError};
pub use state::{LoopToken, LoopTracker};
pub use transform::{resolve, Dispatched, Dispatcher};
