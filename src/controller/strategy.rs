//! Mode-specific implementations of the editing operations.
//!
//! The controller picks one strategy per call from the current
//! [`EditorMode`]; strategies never branch on the mode themselves.
//! Every mutating method returns whether the document content changed.

use crate::error::Result;
use crate::model::document::EditorMode;
use crate::model::selection::{move_selection, CursorDirection, Selection};
use crate::primitives::grapheme::{
    floor_char_boundary, next_grapheme_boundary, prev_grapheme_boundary,
};
use crate::primitives::html::strip_inline_styles;
use crate::state::EditorState;

/// Operations whose behavior depends on the editing mode
pub trait ModeStrategy {
    fn select_all(&self, state: &mut EditorState);

    fn selection(&self, state: &EditorState) -> Selection;

    fn copy(&self, state: &mut EditorState) -> Result<()>;

    fn cut(&self, state: &mut EditorState) -> Result<bool>;

    fn rich_paste(&self, state: &mut EditorState) -> Result<bool>;

    fn plain_text_paste(&self, state: &mut EditorState) -> Result<bool>;

    fn undo(&self, state: &mut EditorState) -> bool;

    fn redo(&self, state: &mut EditorState) -> bool;

    fn can_undo(&self, state: &EditorState) -> bool;

    fn can_redo(&self, state: &EditorState) -> bool;

    fn move_cursor(&self, state: &mut EditorState, direction: CursorDirection, extend: bool);

    fn insert_text(&self, state: &mut EditorState, text: &str) -> bool;

    fn delete(&self, state: &mut EditorState, forward: bool) -> bool;
}

/// Strategy for the current mode
pub fn strategy_for(mode: EditorMode) -> &'static dyn ModeStrategy {
    match mode {
        EditorMode::Plain => &PlainStrategy,
        EditorMode::Rich => &RichStrategy,
    }
}

/// Direct offset editing with snapshot history
pub struct PlainStrategy;

impl ModeStrategy for PlainStrategy {
    fn select_all(&self, state: &mut EditorState) {
        state.selection = Selection::all(&state.document.content);
    }

    fn selection(&self, state: &EditorState) -> Selection {
        state.selection
    }

    fn copy(&self, state: &mut EditorState) -> Result<()> {
        let content = &state.document.content;
        let text = if state.selection.is_empty() {
            content.as_str()
        } else {
            state.selection.slice(content)
        };
        state.clipboard.write_text(text)?;
        Ok(())
    }

    fn cut(&self, state: &mut EditorState) -> Result<bool> {
        let selection = state.selection.clamped(&state.document.content);
        if selection.is_empty() {
            return Ok(false);
        }
        let text = selection.slice(&state.document.content).to_string();
        state.clipboard.write_text(&text)?;
        state.selection = selection;
        Ok(state.replace_plain_selection(""))
    }

    fn rich_paste(&self, state: &mut EditorState) -> Result<bool> {
        // Plain mode has no markup: both pastes insert the text verbatim
        self.plain_text_paste(state)
    }

    fn plain_text_paste(&self, state: &mut EditorState) -> Result<bool> {
        let text = state.clipboard.read_text()?;
        Ok(self.insert_text(state, &text))
    }

    fn undo(&self, state: &mut EditorState) -> bool {
        let Some(previous) = state.history.undo(&state.document.content) else {
            return false;
        };
        restore_plain(state, previous);
        true
    }

    fn redo(&self, state: &mut EditorState) -> bool {
        let Some(next) = state.history.redo(&state.document.content) else {
            return false;
        };
        restore_plain(state, next);
        true
    }

    fn can_undo(&self, state: &EditorState) -> bool {
        state.history.can_undo()
    }

    fn can_redo(&self, state: &EditorState) -> bool {
        state.history.can_redo()
    }

    fn move_cursor(&self, state: &mut EditorState, direction: CursorDirection, extend: bool) {
        state.selection =
            move_selection(&state.document.content, state.selection, direction, extend);
    }

    fn insert_text(&self, state: &mut EditorState, text: &str) -> bool {
        state.replace_plain_selection(text)
    }

    fn delete(&self, state: &mut EditorState, forward: bool) -> bool {
        let content = &state.document.content;
        let selection = state.selection.clamped(content);
        let range = if !selection.is_empty() {
            selection.range()
        } else if forward {
            selection.head..next_grapheme_boundary(content, selection.head)
        } else {
            prev_grapheme_boundary(content, selection.head)..selection.head
        };
        if range.is_empty() {
            return false;
        }
        state.selection = Selection::new(range.start, range.end);
        state.replace_plain_selection("")
    }
}

/// Content restored by undo/redo; the caret stays where it was unless the
/// new content is shorter
fn restore_plain(state: &mut EditorState, content: String) {
    let caret = state.selection.head.min(content.len());
    state.document.content = content;
    state.selection = Selection::caret(floor_char_boundary(&state.document.content, caret));
}

/// Delegates to the rich-text surface
pub struct RichStrategy;

impl RichStrategy {
    fn insert_html(state: &mut EditorState, html: &str) -> bool {
        state.surface.exec("insertHTML", Some(html));
        state.sync_from_surface()
    }

    fn insert_plain(state: &mut EditorState, text: &str) -> bool {
        state.surface.exec("insertText", Some(text));
        state.sync_from_surface()
    }
}

impl ModeStrategy for RichStrategy {
    fn select_all(&self, state: &mut EditorState) {
        state.surface.select_all();
    }

    fn selection(&self, state: &EditorState) -> Selection {
        state.surface.selection()
    }

    fn copy(&self, state: &mut EditorState) -> Result<()> {
        let selected = state.surface.selected_markup().to_string();
        if selected.is_empty() {
            return Ok(());
        }
        state.clipboard.write_text(&selected)?;
        Ok(())
    }

    fn cut(&self, state: &mut EditorState) -> Result<bool> {
        let selected = state.surface.selected_markup().to_string();
        if selected.is_empty() {
            return Ok(false);
        }
        state.clipboard.write_text(&selected)?;
        state.surface.exec("delete", None);
        Ok(state.sync_from_surface())
    }

    fn rich_paste(&self, state: &mut EditorState) -> Result<bool> {
        if let Some(html) = state.clipboard.read_html()? {
            let sanitized = strip_inline_styles(&html);
            return Ok(Self::insert_html(state, &format!("\n{}\n", sanitized)));
        }
        let text = state.clipboard.read_text()?;
        if text.is_empty() {
            return Ok(false);
        }
        Ok(Self::insert_plain(state, &text))
    }

    fn plain_text_paste(&self, state: &mut EditorState) -> Result<bool> {
        let text = state.clipboard.read_text()?;
        Ok(Self::insert_plain(state, &format!("\n{}\n", text)))
    }

    fn undo(&self, state: &mut EditorState) -> bool {
        state.surface.exec("undo", None);
        state.sync_from_surface()
    }

    fn redo(&self, state: &mut EditorState) -> bool {
        state.surface.exec("redo", None);
        state.sync_from_surface()
    }

    fn can_undo(&self, state: &EditorState) -> bool {
        state.surface.can_undo()
    }

    fn can_redo(&self, state: &EditorState) -> bool {
        state.surface.can_redo()
    }

    fn move_cursor(&self, state: &mut EditorState, direction: CursorDirection, extend: bool) {
        state.surface.modify_selection(direction, extend);
    }

    fn insert_text(&self, state: &mut EditorState, text: &str) -> bool {
        Self::insert_plain(state, text)
    }

    fn delete(&self, state: &mut EditorState, forward: bool) -> bool {
        let command = if forward { "forwardDelete" } else { "delete" };
        state.surface.exec(command, None);
        state.sync_from_surface()
    }
}
