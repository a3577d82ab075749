// EditorTestHarness - a buffer controller wired to in-memory services

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use teditor::config::Config;
use teditor::controller::{BufferController, SaveOutcome};
use teditor::model::document::EditorMode;
use teditor::model::selection::{CursorDirection, Selection};
use teditor::persistence::{DocumentMirror, MemoryStore};
use teditor::services::clipboard::{ClipboardError, ClipboardService, MemoryClipboard};
use teditor::services::fs::{FilePicker, SaveRequest, StdFileSystem};
use teditor::services::rich_text::MarkupSurface;
use tempfile::TempDir;

/// File picker answering from queued responses. An empty queue cancels.
#[derive(Debug, Default)]
pub struct ScriptedPicker {
    pub open_paths: VecDeque<Option<PathBuf>>,
    pub save_requests: VecDeque<Option<SaveRequest>>,
    pub save_paths: VecDeque<Option<PathBuf>>,
    /// Number of times each prompt was shown
    pub open_prompts: usize,
    pub dialog_prompts: usize,
    pub save_prompts: usize,
    /// Pre-filled values the save dialog was shown with
    pub dialog_defaults: Vec<(String, String)>,
    /// Names suggested to the save location prompt
    pub suggested_names: Vec<String>,
}

impl ScriptedPicker {
    pub fn prompts(&self) -> usize {
        self.open_prompts + self.dialog_prompts + self.save_prompts
    }
}

impl FilePicker for ScriptedPicker {
    fn pick_open(&mut self) -> io::Result<Option<PathBuf>> {
        self.open_prompts += 1;
        Ok(self.open_paths.pop_front().flatten())
    }

    fn save_dialog(&mut self, name: &str, extension: &str) -> io::Result<Option<SaveRequest>> {
        self.dialog_prompts += 1;
        self.dialog_defaults
            .push((name.to_string(), extension.to_string()));
        Ok(self.save_requests.pop_front().flatten())
    }

    fn pick_save(&mut self, suggested_name: &str) -> io::Result<Option<PathBuf>> {
        self.save_prompts += 1;
        self.suggested_names.push(suggested_name.to_string());
        Ok(self.save_paths.pop_front().flatten())
    }
}

/// Clipboard whose every access fails
pub struct DeniedClipboard;

impl ClipboardService for DeniedClipboard {
    fn read_text(&mut self) -> Result<String, ClipboardError> {
        Err(ClipboardError::Access("permission denied".to_string()))
    }

    fn read_html(&mut self) -> Result<Option<String>, ClipboardError> {
        Err(ClipboardError::Access("permission denied".to_string()))
    }

    fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Access("permission denied".to_string()))
    }
}

pub struct EditorTestHarness {
    pub controller: BufferController,
    pub clipboard: MemoryClipboard,
    pub store: MemoryStore,
    pub picker: ScriptedPicker,
    /// Working directory for files and downloads; removed on drop
    pub temp_dir: TempDir,
}

impl EditorTestHarness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let download_dir = temp_dir.path().join("downloads");
        std::fs::create_dir_all(&download_dir).unwrap();

        let clipboard = MemoryClipboard::new();
        let store = MemoryStore::new();
        let mut controller = BufferController::new(
            &config,
            Box::new(StdFileSystem::new(config.files.direct_write, download_dir)),
            Box::new(clipboard.clone()),
            Box::new(MarkupSurface::new()),
        );
        controller.subscribe(Box::new(DocumentMirror::new(store.clone())));

        Self {
            controller,
            clipboard,
            store,
            picker: ScriptedPicker::default(),
            temp_dir,
        }
    }

    /// Harness whose `save_as` downloads instead of writing in place
    pub fn without_direct_write() -> Self {
        let mut config = Config::default();
        config.files.direct_write = false;
        Self::with_config(config)
    }

    /// Harness with a clipboard that refuses every access
    pub fn with_denied_clipboard() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::default();
        let controller = BufferController::new(
            &config,
            Box::new(StdFileSystem::new(true, temp_dir.path().to_path_buf())),
            Box::new(DeniedClipboard),
            Box::new(MarkupSurface::new()),
        );
        Self {
            controller,
            clipboard: MemoryClipboard::new(),
            store: MemoryStore::new(),
            picker: ScriptedPicker::default(),
            temp_dir,
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    pub fn downloads(&self) -> PathBuf {
        self.temp_dir.path().join("downloads")
    }

    /// Create a file in the temp dir and return its path
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Type text one character at a time, as the terminal would
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.controller.insert_text(&ch.to_string());
        }
    }

    /// Open `path` through the picker
    pub fn open(&mut self, path: &Path) -> bool {
        self.picker.open_paths.push_back(Some(path.to_path_buf()));
        self.controller.open_document(&mut self.picker)
    }

    /// Run `save_as`, choosing `name + extension` in the temp dir as the location
    pub fn save_as(&mut self, name: &str, extension: &str) -> SaveOutcome {
        let path = self.path(&format!("{}{}", name, extension));
        self.picker.save_paths.push_back(Some(path));
        self.controller
            .save_as(name, extension, &mut self.picker)
            .unwrap()
    }

    pub fn quick_save(&mut self) -> SaveOutcome {
        self.controller.quick_save(&mut self.picker)
    }

    /// Select `anchor..head` of ASCII content with the public movement API
    pub fn set_selection(&mut self, anchor: usize, head: usize) {
        self.controller.move_cursor(CursorDirection::Start);
        for _ in 0..anchor {
            self.controller.move_cursor(CursorDirection::Right);
        }
        for _ in anchor..head {
            self.controller.extend_selection(CursorDirection::Right);
        }
        assert_eq!(self.controller.selection(), Selection::new(anchor, head));
    }

    pub fn assert_content(&self, expected: &str) {
        assert_eq!(self.controller.content(), expected, "document content");
    }

    pub fn assert_mode(&self, expected: EditorMode) {
        assert_eq!(self.controller.mode(), expected, "editor mode");
    }
}
