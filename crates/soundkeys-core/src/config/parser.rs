// Soundkeys Config Parser - JSON records with Serde
// Reads and writes binding tables as flat lists of records

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::action::ActionKind;
use crate::key::KeyCode;
use crate::mapping::{Binding, BindingTable};
use crate::modifier::ModifierSet;

/// Configuration parser errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed config record #{index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("No binding config available: {0}")]
    NoConfig(String),
}

impl ConfigError {
    fn malformed(index: usize, reason: impl Into<String>) -> Self {
        ConfigError::MalformedRecord {
            index,
            reason: reason.into(),
        }
    }
}

/// One record as read from disk.
///
/// Every field is optional here so that a missing field is reported as a
/// malformed record with its index instead of a bare serde error.
#[derive(Debug, Deserialize)]
struct RecordIn {
    key: Option<String>,
    modifiers: Option<Vec<String>>,
    #[serde(rename = "type")]
    kind: Option<String>,
    data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SoundDataIn {
    file_path: String,
    loopable: bool,
}

/// One record as written to disk
#[derive(Debug, Serialize)]
struct RecordOut<'a> {
    key: &'a str,
    modifiers: Vec<&'static str>,
    #[serde(rename = "type")]
    kind: &'static str,
    data: DataOut<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum DataOut<'a> {
    Sound {
        #[serde(rename = "filePath")]
        file_path: &'a str,
        loopable: bool,
    },
    Empty {},
}

/// Serialize a binding table into its canonical JSON text.
///
/// Each binding becomes one flat record; keys appear in table order and
/// bindings in per-key order. JSON string escaping makes a key named `\`
/// round-trip losslessly.
pub fn serialize(table: &BindingTable) -> Result<String, ConfigError> {
    let mut records = Vec::with_capacity(table.binding_count());
    for (key, bindings) in table.iter() {
        for binding in bindings {
            let data = match &binding.action {
                ActionKind::PlaySound {
                    file_path,
                    loopable,
                } => DataOut::Sound {
                    file_path: file_path.as_str(),
                    loopable: *loopable,
                },
                ActionKind::StopAll | ActionKind::StopLooping => DataOut::Empty {},
                // Never stored; see BindingTable invariants
                ActionKind::Clear => continue,
            };
            records.push(RecordOut {
                key: key.as_str(),
                modifiers: binding.modifiers.names(),
                kind: binding.action.type_name(),
                data,
            });
        }
    }
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Parse canonical JSON text back into a binding table.
///
/// Records sharing a key become entries of that key's binding list, in
/// file order. Any record missing a required field, naming an unknown
/// modifier, or carrying an unknown action type fails the whole load.
/// A later record repeating an earlier (key, modifiers) pair is skipped.
pub fn deserialize(text: &str) -> Result<BindingTable, ConfigError> {
    let records: Vec<RecordIn> = serde_json::from_str(text)?;
    let mut table = BindingTable::new();

    for (index, record) in records.into_iter().enumerate() {
        let (key, binding) = parse_record(index, record)?;
        if !table.insert_loaded(key.clone(), binding) {
            log::warn!(
                "Skipping duplicate config record #{} for key '{}'",
                index,
                key
            );
        }
    }

    log::debug!(
        "Parsed binding table: {} keys, {} bindings",
        table.len(),
        table.binding_count()
    );
    Ok(table)
}

fn parse_record(index: usize, record: RecordIn) -> Result<(KeyCode, Binding), ConfigError> {
    let key = record
        .key
        .ok_or_else(|| ConfigError::malformed(index, "missing field 'key'"))?;
    if key.is_empty() {
        return Err(ConfigError::malformed(index, "empty key"));
    }
    let names = record
        .modifiers
        .ok_or_else(|| ConfigError::malformed(index, "missing field 'modifiers'"))?;
    let modifiers =
        ModifierSet::parse_names(&names).map_err(|e| ConfigError::malformed(index, e.to_string()))?;
    let kind = record
        .kind
        .ok_or_else(|| ConfigError::malformed(index, "missing field 'type'"))?;

    let data = record
        .data
        .ok_or_else(|| ConfigError::malformed(index, "missing field 'data'"))?;

    let action = match kind.as_str() {
        "sound" => {
            let sound: SoundDataIn = serde_json::from_value(data)
                .map_err(|e| ConfigError::malformed(index, format!("bad sound data: {}", e)))?;
            ActionKind::PlaySound {
                file_path: sound.file_path,
                loopable: sound.loopable,
            }
        }
        "stopAll" | "stopLooping" if !data.is_object() => {
            return Err(ConfigError::malformed(
                index,
                format!("data for '{}' must be an object", kind),
            ))
        }
        "stopAll" => ActionKind::StopAll,
        "stopLooping" => ActionKind::StopLooping,
        other => {
            return Err(ConfigError::malformed(
                index,
                format!("unknown action type '{}'", other),
            ))
        }
    };

    Ok((KeyCode::from(key), Binding::new(modifiers, action)))
}

/// Load a binding table from a JSON config file
pub fn load_path<P: AsRef<Path>>(path: P) -> Result<BindingTable, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let table = deserialize(&content)?;
    log::info!(
        "Loaded {} bindings from {}",
        table.binding_count(),
        path.display()
    );
    Ok(table)
}

/// Write a binding table to a JSON config file
pub fn save_path<P: AsRef<Path>>(table: &BindingTable, path: P) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let text = serialize(table)?;
    fs::write(path, text)?;
    log::info!(
        "Saved {} bindings to {}",
        table.binding_count(),
        path.display()
    );
    Ok(())
}

/// Binding config files in a directory, sorted by name.
///
/// Every `*.json` file counts except `settings.json`.
pub fn list_configs<P: AsRef<Path>>(dir: P) -> Result<Vec<String>, ConfigError> {
    let mut names: Vec<String> = fs::read_dir(dir.as_ref())?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".json") && !name.ends_with("settings.json"))
        .collect();
    names.sort();
    Ok(names)
}
