// Soundkeys Config API
// Persisted binding tables

pub mod parser;

pub use parser::{deserialize, list_configs, load_path, save_path, serialize, ConfigError};
