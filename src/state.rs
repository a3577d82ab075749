use crate::model::document::{Document, EditorMode};
use crate::model::history::History;
use crate::model::selection::Selection;
use crate::services::clipboard::ClipboardService;
use crate::services::rich_text::RichTextSurface;

/// State owned by the buffer controller and operated on by the mode
/// strategies
pub struct EditorState {
    /// The document (content, mode, file name and binding)
    pub document: Document,

    /// Plain-mode snapshot history
    pub history: History,

    /// Plain-mode selection (byte offsets into `document.content`)
    pub selection: Selection,

    /// Rich editing surface; authoritative for content while in rich mode
    pub surface: Box<dyn RichTextSurface>,

    pub clipboard: Box<dyn ClipboardService>,
}

impl EditorState {
    pub fn new(
        document: Document,
        history: History,
        surface: Box<dyn RichTextSurface>,
        clipboard: Box<dyn ClipboardService>,
    ) -> Self {
        Self {
            document,
            history,
            selection: Selection::default(),
            surface,
            clipboard,
        }
    }

    pub fn mode(&self) -> EditorMode {
        self.document.mode
    }

    /// Replace the plain content as a direct edit: records the previous
    /// content in the history and places a caret at `caret`.
    pub fn edit_plain(&mut self, content: String, caret: usize) {
        self.history.record(&self.document.content);
        self.document.content = content;
        self.selection = Selection::caret(caret).clamped(&self.document.content);
    }

    /// Replace the plain selection with `text` as one direct edit.
    ///
    /// Replacing a selection with identical text only moves the caret and
    /// records nothing. Returns whether the content changed.
    pub fn replace_plain_selection(&mut self, text: &str) -> bool {
        let range = self.selection.clamped(&self.document.content).range();
        let caret = range.start + text.len();
        if self.document.content[range.clone()] == *text {
            self.selection = Selection::caret(caret);
            return false;
        }
        let mut content = self.document.content.clone();
        content.replace_range(range, text);
        self.edit_plain(content, caret);
        true
    }

    /// Load `content` into the rich surface (entering rich mode or loading
    /// a file while in rich mode)
    pub fn load_surface(&mut self) {
        self.surface.load(&self.document.content);
    }

    /// Copy the surface markup into the document. Returns whether the
    /// content changed.
    ///
    /// A rich edit is a direct edit of the content, so plain redo states
    /// recorded before it are dropped.
    pub fn sync_from_surface(&mut self) -> bool {
        if self.surface.markup() == self.document.content {
            return false;
        }
        self.document.content = self.surface.markup().to_string();
        self.history.clear_future();
        true
    }
}
