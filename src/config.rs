use crate::model::document::{DEFAULT_FILE_EXTENSION, DEFAULT_FILE_NAME};
use crate::model::history::DEFAULT_HISTORY_CAPACITY;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    /// Editing behavior (history size, new-document defaults)
    #[serde(default)]
    pub editor: EditorConfig,

    /// Opening and saving files
    #[serde(default)]
    pub files: FilesConfig,

    /// Mirroring the document to local storage between sessions
    #[serde(default)]
    pub storage: StorageConfig,

    /// Custom keybindings (override the built-in bindings)
    #[serde(default)]
    pub keybindings: Vec<Keybinding>,
}

/// Editor behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EditorConfig {
    /// Maximum number of undo snapshots kept in plain mode
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Base name of a new document
    #[serde(default = "default_file_name")]
    pub default_file_name: String,

    /// Extension of a new document, including the leading dot
    #[serde(default = "default_extension")]
    pub default_extension: String,
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_file_name() -> String {
    DEFAULT_FILE_NAME.to_string()
}

fn default_extension() -> String {
    DEFAULT_FILE_EXTENSION.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            default_file_name: default_file_name(),
            default_extension: default_extension(),
        }
    }
}

/// File open/save configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FilesConfig {
    /// Write files to a chosen location. When false, "save as" always
    /// downloads into `download_dir` instead.
    #[serde(default = "default_true")]
    pub direct_write: bool,

    /// Where downloads are written (default: the platform downloads directory)
    #[serde(default)]
    pub download_dir: Option<PathBuf>,

    /// Extensions offered by the open prompt (empty accepts any file)
    #[serde(default = "default_open_extensions")]
    pub open_extensions: Vec<String>,
}

fn default_open_extensions() -> Vec<String> {
    ["txt", "html", "htm", "md", "json", "xml", "css", "js", "ts"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            direct_write: true,
            download_dir: None,
            open_extensions: default_open_extensions(),
        }
    }
}

/// Local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StorageConfig {
    /// Restore the last document at startup and mirror every change
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Store file location (default: `<data dir>/teditor/state.json`)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

/// Keybinding definition
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Keybinding {
    /// Key name (e.g., "a", "Enter", "F1")
    pub key: String,

    /// Modifiers (e.g., ["ctrl"], ["ctrl", "shift"])
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,

    /// Action to perform (e.g., "save", "move_left", "format")
    pub action: String,

    /// Optional arguments for the action (e.g., {"command": "bold"})
    #[serde(default)]
    pub args: HashMap<String, serde_json::Value>,

    /// Mode the binding applies to: "plain", "rich" or "global" (default)
    #[serde(default)]
    pub when: Option<String>,
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Serialize error: {0}")]
    SerializeError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl Config {
    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("teditor").join("config.json"))
    }

    /// Load configuration from the default location, falling back to defaults if not found
    pub fn load_or_default() -> Self {
        if let Some(config_path) = Self::default_config_path() {
            if config_path.exists() {
                match Self::load_from_file(&config_path) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!(
                            "Failed to load config from {}: {}, using defaults",
                            config_path.display(),
                            e
                        );
                    }
                }
            }
        }
        Self::default()
    }

    /// Load configuration from a JSON file; missing fields take their defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let config: Config =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path.as_ref(), contents).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// JSON Schema of the config file
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(Config)).unwrap_or_default()
    }

    /// Reject values the editor can't work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.editor.default_extension.starts_with('.') {
            return Err(ConfigError::ValidationError(format!(
                "editor.default_extension must start with '.', got {:?}",
                self.editor.default_extension
            )));
        }
        if self.editor.history_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "editor.history_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolved download directory
    pub fn download_dir(&self) -> PathBuf {
        self.files
            .download_dir
            .clone()
            .unwrap_or_else(crate::services::fs::StdFileSystem::default_download_dir)
    }

    /// Resolved store file path, if storage is enabled and a location exists
    pub fn storage_path(&self) -> Option<PathBuf> {
        if !self.storage.enabled {
            return None;
        }
        self.storage
            .path
            .clone()
            .or_else(crate::persistence::JsonFileStore::default_path)
    }
}
