//! Local key-value persistence of the document across sessions.
//!
//! The controller never writes storage itself. A [`DocumentMirror`]
//! subscribes to controller events and copies the affected fields into a
//! [`KeyValueStore`]; at startup [`PersistedDocument::load`] reads them back.
//!
//! ## Storage
//!
//! [`JsonFileStore`] keeps all keys in one JSON object, by default in
//! `$XDG_DATA_HOME/teditor/state.json`. Writes are atomic: write to a temp
//! file in the same directory, then rename over the target.

use crate::model::document::{Document, EditorMode};
use crate::model::event::{DocumentEvent, DocumentObserver};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const KEY_CONTENT: &str = "editor-content";
pub const KEY_MODE: &str = "editor-mode";
pub const KEY_FILE_NAME: &str = "editor-filename";
pub const KEY_EXTENSION: &str = "editor-extension";

/// Errors from a persistence backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Trait for pluggable string key-value backends
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.lock().remove(key);
        Ok(())
    }
}

/// JSON file store with atomic writes
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Default location of the store file
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("teditor").join("state.json"))
    }

    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable or corrupt one is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries })
    }

    fn persist(&self) -> Result<(), StoreError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;
        let contents = serde_json::to_string_pretty(&self.entries)?;
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(contents.as_bytes())?;
        temp.flush()?;
        temp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.entries.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

/// Document fields restored at startup. Missing keys keep the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedDocument {
    pub content: Option<String>,
    pub mode: Option<EditorMode>,
    pub file_name: Option<String>,
    pub file_extension: Option<String>,
}

impl PersistedDocument {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self {
            content: store.get(KEY_CONTENT),
            mode: store.get(KEY_MODE).and_then(|m| EditorMode::parse(&m)),
            file_name: store.get(KEY_FILE_NAME),
            file_extension: store
                .get(KEY_EXTENSION)
                .filter(|ext| ext.starts_with('.')),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.mode.is_none()
            && self.file_name.is_none()
            && self.file_extension.is_none()
    }
}

/// Mirrors document state into a key-value store on every change
pub struct DocumentMirror<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> DocumentMirror<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn write_all(&mut self, document: &Document) -> Result<(), StoreError> {
        self.store.set(KEY_CONTENT, &document.content)?;
        self.store.set(KEY_MODE, document.mode.as_str())?;
        self.store.set(KEY_FILE_NAME, &document.file_name)?;
        self.store.set(KEY_EXTENSION, &document.file_extension)
    }

    fn mirror(&mut self, event: &DocumentEvent, document: &Document) -> Result<(), StoreError> {
        match event {
            DocumentEvent::ContentChanged => self.store.set(KEY_CONTENT, &document.content),
            DocumentEvent::ModeChanged { mode } => self.store.set(KEY_MODE, mode.as_str()),
            DocumentEvent::FileChanged => {
                self.store.set(KEY_FILE_NAME, &document.file_name)?;
                self.store.set(KEY_EXTENSION, &document.file_extension)
            }
            DocumentEvent::Reset => self.write_all(document),
        }
    }
}

impl<S: KeyValueStore> DocumentObserver for DocumentMirror<S> {
    fn on_event(&mut self, event: &DocumentEvent, document: &Document) {
        if let Err(e) = self.mirror(event, document) {
            tracing::warn!("Failed to persist document state: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_json_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set(KEY_CONTENT, "hello").unwrap();
        store.set(KEY_MODE, "rich").unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get(KEY_CONTENT).as_deref(), Some("hello"));
        assert_eq!(reopened.get(KEY_MODE).as_deref(), Some("rich"));
        assert_eq!(reopened.get("missing"), None);
    }

    #[test]
    fn test_json_store_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_persisted_document_load() {
        let mut store = MemoryStore::new();
        assert!(PersistedDocument::load(&store).is_empty());

        store.set(KEY_CONTENT, "<p>x</p>").unwrap();
        store.set(KEY_MODE, "rich").unwrap();
        store.set(KEY_FILE_NAME, "page").unwrap();
        store.set(KEY_EXTENSION, "html").unwrap();

        let persisted = PersistedDocument::load(&store);
        assert_eq!(persisted.content.as_deref(), Some("<p>x</p>"));
        assert_eq!(persisted.mode, Some(EditorMode::Rich));
        assert_eq!(persisted.file_name.as_deref(), Some("page"));
        // An extension without its dot is not trusted
        assert_eq!(persisted.file_extension, None);
    }

    #[test]
    fn test_mirror_writes_only_affected_keys() {
        let store = MemoryStore::new();
        let mut mirror = DocumentMirror::new(store.clone());
        let mut doc = Document::default();
        doc.content = "abc".to_string();

        mirror.on_event(&DocumentEvent::ContentChanged, &doc);
        assert_eq!(store.get(KEY_CONTENT).as_deref(), Some("abc"));
        assert_eq!(store.get(KEY_MODE), None);

        mirror.on_event(&DocumentEvent::Reset, &doc);
        assert_eq!(store.len(), 4);
        assert_eq!(store.get(KEY_EXTENSION).as_deref(), Some(".txt"));
    }
}
