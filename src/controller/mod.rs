//! The editing buffer controller.
//!
//! Owns the document, the plain-mode history and the injected platform
//! services, and exposes every user-facing editing operation:
//! - File lifecycle: new, open, quick save, save as
//! - Clipboard: copy, cut, rich paste, plain-text paste
//! - Undo/redo, cursor movement, selection
//! - Rich formatting commands and HTML preview
//!
//! Platform failures are logged and leave the state unchanged. After each
//! mutation the controller notifies its observers with a [`DocumentEvent`].

pub mod strategy;

use crate::config::Config;
use crate::error::{EditorError, Result};
use crate::model::document::{Document, EditorMode, FileBinding};
use crate::model::event::{DocumentEvent, DocumentObserver, EventLog};
use crate::model::history::History;
use crate::model::selection::{CursorDirection, Selection};
use crate::persistence::PersistedDocument;
use crate::services::clipboard::ClipboardService;
use crate::services::fs::{FilePicker, FileSystem};
use crate::services::preview::PreviewBrowser;
use crate::services::rich_text::RichTextSurface;
use crate::state::EditorState;
use std::path::{Path, PathBuf};
use strategy::{strategy_for, ModeStrategy};

/// Result of a save operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written to a bound file
    Saved(PathBuf),
    /// Delivered as a download; the document stays unbound
    Downloaded(PathBuf),
    /// The user dismissed a dialog
    Cancelled,
    /// The write failed; details are in the log
    Failed,
}

/// Defaults applied by `new_document`
#[derive(Debug, Clone)]
struct NewDocumentDefaults {
    file_name: String,
    file_extension: String,
}

pub struct BufferController {
    state: EditorState,
    fs: Box<dyn FileSystem>,
    observers: Vec<Box<dyn DocumentObserver>>,
    events: EventLog,
    defaults: NewDocumentDefaults,
}

impl BufferController {
    pub fn new(
        config: &Config,
        fs: Box<dyn FileSystem>,
        clipboard: Box<dyn ClipboardService>,
        surface: Box<dyn RichTextSurface>,
    ) -> Self {
        let defaults = NewDocumentDefaults {
            file_name: config.editor.default_file_name.clone(),
            file_extension: config.editor.default_extension.clone(),
        };
        let document = Document::new(&defaults.file_name, &defaults.file_extension);
        let history = History::new(config.editor.history_capacity);
        Self {
            state: EditorState::new(document, history, surface, clipboard),
            fs,
            observers: Vec::new(),
            events: EventLog::new(),
            defaults,
        }
    }

    /// Subscribe an observer to change events
    pub fn subscribe(&mut self, observer: Box<dyn DocumentObserver>) {
        self.observers.push(observer);
    }

    // ==================== Accessors ====================

    pub fn document(&self) -> &Document {
        &self.state.document
    }

    pub fn content(&self) -> &str {
        &self.state.document.content
    }

    pub fn mode(&self) -> EditorMode {
        self.state.mode()
    }

    /// Selection on the active surface (plain buffer or rich surface)
    pub fn selection(&self) -> Selection {
        self.strategy().selection(&self.state)
    }

    pub fn can_undo(&self) -> bool {
        self.strategy().can_undo(&self.state)
    }

    pub fn can_redo(&self) -> bool {
        self.strategy().can_redo(&self.state)
    }

    /// Plain-mode history, for inspection
    pub fn history(&self) -> &History {
        &self.state.history
    }

    pub fn bound_path(&self) -> Option<&Path> {
        self.state.document.binding.as_ref().map(FileBinding::path)
    }

    /// Drain the events emitted since the last call
    pub fn take_events(&mut self) -> Vec<DocumentEvent> {
        self.events.take()
    }

    fn strategy(&self) -> &'static dyn ModeStrategy {
        strategy_for(self.state.mode())
    }

    fn emit(&mut self, event: DocumentEvent) {
        tracing::trace!("Document event: {:?}", event);
        for observer in &mut self.observers {
            observer.on_event(&event, &self.state.document);
        }
        self.events.push(event);
    }

    fn emit_if(&mut self, changed: bool) -> bool {
        if changed {
            self.emit(DocumentEvent::ContentChanged);
        }
        changed
    }

    // ==================== Startup ====================

    /// Apply persisted state at startup. Emits no events and leaves the
    /// history empty.
    pub fn restore(&mut self, persisted: PersistedDocument) {
        let doc = &mut self.state.document;
        if let Some(content) = persisted.content {
            doc.content = content;
        }
        if let Some(mode) = persisted.mode {
            doc.mode = mode;
        }
        if let Some(name) = persisted.file_name {
            doc.file_name = name;
        }
        if let Some(extension) = persisted.file_extension {
            doc.file_extension = extension;
        }
        self.state.selection = Selection::caret(0);
        if self.state.document.mode == EditorMode::Rich {
            self.state.load_surface();
        }
        tracing::debug!(
            "Restored {} ({} bytes, {} mode)",
            self.state.document.full_name(),
            self.state.document.content.len(),
            self.state.document.mode
        );
    }

    // ==================== File lifecycle ====================

    /// Reset to an empty, unbound plain document
    pub fn new_document(&mut self) {
        self.state.document =
            Document::new(&self.defaults.file_name, &self.defaults.file_extension);
        self.state.selection = Selection::caret(0);
        self.state.history.clear();
        self.state.surface.load("");
        tracing::info!("New document");
        self.emit(DocumentEvent::Reset);
    }

    /// Ask the picker for a file and load it, binding the document to it.
    /// Returns false if the user cancelled or the read failed.
    pub fn open_document(&mut self, picker: &mut dyn FilePicker) -> bool {
        let path = match picker.pick_open() {
            Ok(Some(path)) => path,
            Ok(None) => {
                tracing::info!("Open cancelled");
                return false;
            }
            Err(e) => {
                tracing::warn!("File picker failed: {}", e);
                return false;
            }
        };
        self.open_path(&path)
    }

    /// Load the file at `path` and bind the document to it
    pub fn open_path(&mut self, path: &Path) -> bool {
        let text = match self.fs.read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                return false;
            }
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::info!("Opened {} ({} bytes)", path.display(), text.len());
        self.load(&name, text, Some(FileBinding::new(path)));
        true
    }

    /// Load a file handed over without write permission (an upload). The
    /// document ends up unbound.
    pub fn open_upload(&mut self, name: &str, text: String) {
        tracing::info!("Loaded upload {} ({} bytes)", name, text.len());
        self.load(name, text, None);
    }

    fn load(&mut self, base_name: &str, text: String, binding: Option<FileBinding>) {
        let old_mode = self.state.document.mode;
        let doc = &mut self.state.document;
        doc.content = text;
        doc.binding = binding;
        if !doc.adopt_name(base_name) {
            tracing::debug!("{:?} has no extension, keeping name and mode", base_name);
        }
        self.state.selection = Selection::caret(0);
        self.state.history.clear();
        if self.state.document.mode == EditorMode::Rich {
            self.state.load_surface();
        }

        self.emit(DocumentEvent::ContentChanged);
        self.emit(DocumentEvent::FileChanged);
        let mode = self.state.document.mode;
        if mode != old_mode {
            self.emit(DocumentEvent::ModeChanged { mode });
        }
    }

    /// Save to the bound file, or run the save-as flow when unbound or when
    /// writing the bound file fails
    pub fn quick_save(&mut self, picker: &mut dyn FilePicker) -> SaveOutcome {
        if let Some(binding) = self.state.document.binding.clone() {
            match self.fs.write(binding.path(), &self.state.document.content) {
                Ok(()) => {
                    tracing::info!("Saved {}", binding.path().display());
                    return SaveOutcome::Saved(binding.path().to_path_buf());
                }
                Err(e) => {
                    tracing::warn!(
                        "Quick save to {} failed, falling back to save as: {}",
                        binding.path().display(),
                        e
                    );
                }
            }
        }
        self.save_as_dialog(picker)
    }

    /// The save-as flow: ask for name and extension, then `save_as`
    pub fn save_as_dialog(&mut self, picker: &mut dyn FilePicker) -> SaveOutcome {
        let doc = &self.state.document;
        let request = match picker.save_dialog(&doc.file_name, &doc.file_extension) {
            Ok(Some(request)) => request,
            Ok(None) => {
                tracing::info!("Save cancelled");
                return SaveOutcome::Cancelled;
            }
            Err(e) => {
                tracing::warn!("Save dialog failed: {}", e);
                return SaveOutcome::Failed;
            }
        };
        match self.save_as(&request.name, &request.extension, picker) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Save as failed: {}", e);
                SaveOutcome::Failed
            }
        }
    }

    /// Save under `name + extension`.
    ///
    /// With direct writes the picker chooses the location and the document
    /// adopts the new binding, name and extension. Otherwise the content is
    /// downloaded and the document is left as it was.
    pub fn save_as(
        &mut self,
        name: &str,
        extension: &str,
        picker: &mut dyn FilePicker,
    ) -> Result<SaveOutcome> {
        if !extension.starts_with('.') {
            return Err(EditorError::InvalidExtension(extension.to_string()));
        }
        let full_name = format!("{}{}", name, extension);

        if !self.fs.supports_direct_write() {
            return Ok(match self.fs.download(&full_name, &self.state.document.content) {
                Ok(path) => {
                    tracing::info!("Downloaded {} to {}", full_name, path.display());
                    SaveOutcome::Downloaded(path)
                }
                Err(e) => {
                    tracing::warn!("Download of {} failed: {}", full_name, e);
                    SaveOutcome::Failed
                }
            });
        }

        let path = match picker.pick_save(&full_name) {
            Ok(Some(path)) => path,
            Ok(None) => {
                tracing::info!("Save as cancelled");
                return Ok(SaveOutcome::Cancelled);
            }
            Err(e) => {
                tracing::warn!("Save picker failed: {}", e);
                return Ok(SaveOutcome::Failed);
            }
        };

        if let Err(e) = self.fs.write(&path, &self.state.document.content) {
            tracing::warn!("Failed to write {}: {}", path.display(), e);
            return Ok(SaveOutcome::Failed);
        }

        let doc = &mut self.state.document;
        doc.binding = Some(FileBinding::new(&path));
        doc.file_name = name.to_string();
        doc.file_extension = extension.to_string();
        tracing::info!("Saved as {}", path.display());
        self.emit(DocumentEvent::FileChanged);
        Ok(SaveOutcome::Saved(path))
    }

    // ==================== Mode ====================

    /// Switch editing mode. Content is never transformed.
    pub fn set_mode(&mut self, mode: EditorMode) {
        if self.state.document.mode == mode {
            return;
        }
        self.state.document.mode = mode;
        match mode {
            EditorMode::Rich => self.state.load_surface(),
            EditorMode::Plain => {
                self.state.selection = self.state.selection.clamped(&self.state.document.content)
            }
        }
        tracing::debug!("Mode switched to {}", mode);
        self.emit(DocumentEvent::ModeChanged { mode });
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.state.document.mode.toggled());
    }

    // ==================== Selection & movement ====================

    pub fn select_all(&mut self) {
        self.strategy().select_all(&mut self.state);
    }

    /// Collapse the selection and move the caret
    pub fn move_cursor(&mut self, direction: CursorDirection) {
        self.strategy().move_cursor(&mut self.state, direction, false);
    }

    /// Move the selection head, keeping the anchor
    pub fn extend_selection(&mut self, direction: CursorDirection) {
        self.strategy().move_cursor(&mut self.state, direction, true);
    }

    // ==================== Clipboard ====================

    pub fn copy(&mut self) -> bool {
        match self.strategy().copy(&mut self.state) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Copy failed: {}", e);
                false
            }
        }
    }

    /// Cut the selection. An empty selection is a no-op.
    pub fn cut(&mut self) -> bool {
        let result = self.strategy().cut(&mut self.state);
        self.finish_clipboard_edit("Cut", result)
    }

    /// Paste, keeping markup from an HTML clipboard payload (minus inline
    /// styles) in rich mode
    pub fn rich_paste(&mut self) -> bool {
        let result = self.strategy().rich_paste(&mut self.state);
        self.finish_clipboard_edit("Paste", result)
    }

    /// Paste clipboard text without interpreting any markup
    pub fn plain_text_paste(&mut self) -> bool {
        let result = self.strategy().plain_text_paste(&mut self.state);
        self.finish_clipboard_edit("Plain-text paste", result)
    }

    fn finish_clipboard_edit(&mut self, what: &str, result: Result<bool>) -> bool {
        match result {
            Ok(changed) => self.emit_if(changed),
            Err(e) => {
                tracing::warn!("{} failed: {}", what, e);
                false
            }
        }
    }

    // ==================== Editing ====================

    pub fn insert_text(&mut self, text: &str) -> bool {
        let changed = self.strategy().insert_text(&mut self.state, text);
        self.emit_if(changed)
    }

    pub fn delete_backward(&mut self) -> bool {
        let changed = self.strategy().delete(&mut self.state, false);
        self.emit_if(changed)
    }

    pub fn delete_forward(&mut self) -> bool {
        let changed = self.strategy().delete(&mut self.state, true);
        self.emit_if(changed)
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.strategy().undo(&mut self.state);
        self.emit_if(changed)
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.strategy().redo(&mut self.state);
        self.emit_if(changed)
    }

    /// Run a rich-text formatting command. Ignored in plain mode; unknown
    /// commands are ignored by the surface.
    pub fn exec_format(&mut self, command: &str, value: Option<&str>) -> bool {
        if self.state.mode() != EditorMode::Rich {
            tracing::debug!("Ignoring format command {:?} in plain mode", command);
            return false;
        }
        self.state.surface.exec(command, value);
        let changed = self.state.sync_from_surface();
        self.emit_if(changed)
    }

    /// Open the current content as an HTML page
    pub fn preview(&self, browser: &mut dyn PreviewBrowser) -> bool {
        match browser.open_html(&self.state.document.content) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Preview failed: {}", e);
                false
            }
        }
    }
}
