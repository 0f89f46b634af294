// Soundkeys Settings Module
// User settings: last used binding config, capslock policy, config directory

use std::path::{Path, PathBuf};

use crate::modifier::CapsLockPolicy;

const DEFAULT_CONFIG_DIR: &str = "configs";

/// Application settings
///
/// These settings are loaded from a TOML file (default: ~/.config/soundkeys/settings.toml).
/// A missing file means defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// File name of the binding config opened last, inside `config_dir`
    last_used_config: Option<String>,

    /// How capslock takes part in resolution
    capslock: CapsLockPolicy,

    /// Directory holding binding configs
    config_dir: PathBuf,

    /// Path to the settings file (for reload and save)
    source_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading or saving settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(String),

    #[error("Invalid setting value: {0}")]
    InvalidValue(String),
}

/// TOML representation of the settings file
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
struct SettingsToml {
    #[serde(default)]
    keyboard: Option<KeyboardSettings>,

    #[serde(default)]
    paths: Option<PathSettings>,
}

#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
struct KeyboardSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_used_config: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    capslock: Option<CapsLockPolicy>,
}

#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
struct PathSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    config_dir: Option<String>,
}

impl Settings {
    /// Create settings holding the defaults
    pub fn new() -> Self {
        Self {
            last_used_config: None,
            capslock: CapsLockPolicy::default(),
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            source_path: None,
        }
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(&path)?;
        let mut settings = Self::from_toml(&content)?;
        settings.source_path = Some(path.as_ref().to_path_buf());
        log::debug!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load settings from TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let toml_settings: SettingsToml =
            toml::from_str(content).map_err(|e| SettingsError::TomlParse(e.to_string()))?;

        let mut settings = Self::new();

        if let Some(keyboard) = toml_settings.keyboard {
            settings.last_used_config = keyboard.last_used_config.filter(|name| !name.is_empty());
            settings.capslock = keyboard.capslock.unwrap_or_default();
        }

        if let Some(paths) = toml_settings.paths {
            if let Some(dir) = paths.config_dir {
                if dir.is_empty() {
                    return Err(SettingsError::InvalidValue(
                        "paths.config_dir must not be empty".to_string(),
                    ));
                }
                settings.config_dir = PathBuf::from(dir);
            }
        }

        Ok(settings)
    }

    /// Render the settings as TOML
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        let doc = SettingsToml {
            keyboard: Some(KeyboardSettings {
                last_used_config: self.last_used_config.clone(),
                capslock: Some(self.capslock),
            }),
            paths: Some(PathSettings {
                config_dir: Some(self.config_dir.to_string_lossy().into_owned()),
            }),
        };
        toml::to_string_pretty(&doc).map_err(|e| SettingsError::TomlSerialize(e.to_string()))
    }

    /// Write the settings to a TOML file, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_toml()?)?;
        log::info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Write the settings back to the file they were loaded from
    pub fn save_to_source(&self) -> Result<(), SettingsError> {
        match self.source_path {
            Some(ref path) => self.save(path),
            None => Err(SettingsError::InvalidValue("No source path set".to_string())),
        }
    }

    /// Get the default settings path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("soundkeys").join("settings.toml"))
    }

    /// Load from default location (~/.config/soundkeys/settings.toml)
    pub fn load_default() -> Result<Self, SettingsError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
            let mut settings = Self::new();
            settings.source_path = Some(path);
            return Ok(settings);
        }
        Ok(Self::new())
    }

    /// Load from an explicit path, falling back to defaults if it does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }
        log::debug!("No settings at {}, using defaults", path.display());
        let mut settings = Self::new();
        settings.source_path = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Restore every setting to its default, keeping the source path
    pub fn reset(&mut self) {
        let source_path = self.source_path.take();
        *self = Self::new();
        self.source_path = source_path;
    }

    /// Reload settings from the file they were loaded from
    pub fn reload(&mut self) -> Result<(), SettingsError> {
        if let Some(ref path) = self.source_path {
            let new_settings = Self::from_file(path)?;
            *self = new_settings;
            Ok(())
        } else {
            Err(SettingsError::InvalidValue("No source path set".to_string()))
        }
    }

    pub fn last_used_config(&self) -> Option<&str> {
        self.last_used_config.as_deref()
    }

    pub fn set_last_used_config(&mut self, name: Option<String>) {
        self.last_used_config = name;
    }

    pub fn capslock(&self) -> CapsLockPolicy {
        self.capslock
    }

    pub fn set_capslock(&mut self, policy: CapsLockPolicy) {
        self.capslock = policy;
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn set_config_dir(&mut self, dir: impl Into<PathBuf>) {
        self.config_dir = dir.into();
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Directory holding binding configs.
    ///
    /// A relative `config_dir` is resolved against the directory of the
    /// settings file when one is known.
    pub fn resolved_config_dir(&self) -> PathBuf {
        match self.source_path.as_ref().and_then(|p| p.parent()) {
            Some(base) if self.config_dir.is_relative() => base.join(&self.config_dir),
            _ => self.config_dir.clone(),
        }
    }

    /// Path of the last used binding config
    pub fn config_path(&self) -> Option<PathBuf> {
        let name = self.last_used_config.as_ref()?;
        Some(self.resolved_config_dir().join(name))
    }
}

/// Create default settings content for a new installation
pub fn default_settings_content() -> &'static str {
    r#"# Soundkeys Settings
# Place this file at: ~/.config/soundkeys/settings.toml

[keyboard]
# Binding config opened at startup, relative to paths.config_dir
# last_used_config = "default.json"

# "distinct": capslock+a and a are different bindings
# "ignore": capslock is dropped from key events before lookup
capslock = "distinct"

[paths]
# Directory holding binding configs, relative to this file
config_dir = "configs"
"#
}
