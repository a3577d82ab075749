//! The rich editing surface.
//!
//! In rich mode the controller does not edit markup itself: it hands named
//! editing commands (`bold`, `insertHTML`, `undo`, ...) to a
//! [`RichTextSurface`] and reads the resulting markup back. The surface owns
//! its own selection and its own undo history.

use crate::model::selection::{move_selection, CursorDirection, Selection};
use crate::primitives::grapheme::{next_grapheme_boundary, prev_grapheme_boundary};
use crate::primitives::html::escape_text;

/// Block-level elements accepted by `formatBlock`
const BLOCK_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "p", "div", "pre", "blockquote"];

/// A parsed rich-text editing command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RichCommand {
    Bold,
    Italic,
    Underline,
    Justify(Alignment),
    UnorderedList,
    OrderedList,
    CreateLink(String),
    FormatBlock(String),
    InsertText(String),
    InsertHtml(String),
    Delete,
    ForwardDelete,
    Undo,
    Redo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    fn css(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

impl RichCommand {
    /// Parse a command name and optional value.
    ///
    /// Returns `None` for unknown commands and for commands whose required
    /// value is missing or unusable; callers ignore those.
    pub fn parse(name: &str, value: Option<&str>) -> Option<Self> {
        let command = match name {
            "bold" => RichCommand::Bold,
            "italic" => RichCommand::Italic,
            "underline" => RichCommand::Underline,
            "justifyLeft" => RichCommand::Justify(Alignment::Left),
            "justifyCenter" => RichCommand::Justify(Alignment::Center),
            "justifyRight" => RichCommand::Justify(Alignment::Right),
            "insertUnorderedList" => RichCommand::UnorderedList,
            "insertOrderedList" => RichCommand::OrderedList,
            "createLink" => {
                let url = value.map(str::trim).filter(|v| !v.is_empty())?;
                RichCommand::CreateLink(url.to_string())
            }
            "formatBlock" => {
                let tag = value?
                    .trim()
                    .trim_start_matches('<')
                    .trim_end_matches('>')
                    .to_ascii_lowercase();
                if !BLOCK_TAGS.contains(&tag.as_str()) {
                    return None;
                }
                RichCommand::FormatBlock(tag)
            }
            "insertText" => RichCommand::InsertText(value?.to_string()),
            "insertHTML" => RichCommand::InsertHtml(value?.to_string()),
            "delete" => RichCommand::Delete,
            "forwardDelete" => RichCommand::ForwardDelete,
            "undo" => RichCommand::Undo,
            "redo" => RichCommand::Redo,
            _ => return None,
        };
        Some(command)
    }
}

/// Native-style rich editing capability operating on its current selection
pub trait RichTextSurface {
    /// Replace the whole surface with `markup`, caret at the start.
    /// Clears the surface history.
    fn load(&mut self, markup: &str);

    /// Current serialized markup
    fn markup(&self) -> &str;

    fn selection(&self) -> Selection;

    fn set_selection(&mut self, selection: Selection);

    /// Select the entire surface contents
    fn select_all(&mut self) {
        let all = Selection::all(self.markup());
        self.set_selection(all);
    }

    /// The currently selected markup
    fn selected_markup(&self) -> &str {
        self.selection().slice(self.markup())
    }

    /// Move (or extend) the selection
    fn modify_selection(&mut self, direction: CursorDirection, extend: bool) {
        let selection = move_selection(self.markup(), self.selection(), direction, extend);
        self.set_selection(selection);
    }

    /// Execute an editing command. Returns false when the command is unknown
    /// or had nothing to act on.
    fn exec(&mut self, command: &str, value: Option<&str>) -> bool;

    fn can_undo(&self) -> bool;

    fn can_redo(&self) -> bool;
}

#[derive(Debug, Clone)]
struct SurfaceState {
    markup: String,
    selection: Selection,
}

/// Markup-editing surface: applies commands directly to the HTML text.
#[derive(Debug, Clone, Default)]
pub struct MarkupSurface {
    markup: String,
    selection: Selection,
    undo_stack: Vec<SurfaceState>,
    redo_stack: Vec<SurfaceState>,
}

impl MarkupSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> SurfaceState {
        SurfaceState {
            markup: self.markup.clone(),
            selection: self.selection,
        }
    }

    fn restore(&mut self, state: SurfaceState) {
        self.markup = state.markup;
        self.selection = state.selection.clamped(&self.markup);
    }

    fn checkpoint(&mut self) {
        let state = self.snapshot();
        self.undo_stack.push(state);
        self.redo_stack.clear();
    }

    /// Replace the selection with `text`; caret ends after the insertion
    fn replace_selection(&mut self, text: &str) {
        let range = self.selection.clamped(&self.markup).range();
        let start = range.start;
        self.markup.replace_range(range, text);
        self.selection = Selection::caret(start + text.len());
    }

    /// Surround the selection with `open`/`close`; the wrapped content stays
    /// selected (or the caret sits between the tags when nothing was selected)
    fn wrap_selection(&mut self, open: &str, close: &str) {
        let range = self.selection.clamped(&self.markup).range();
        let inner = self.markup[range.clone()].to_string();
        let start = range.start;
        self.markup
            .replace_range(range, &format!("{}{}{}", open, inner, close));
        let inner_start = start + open.len();
        self.selection = Selection::new(inner_start, inner_start + inner.len());
    }

    fn delete(&mut self, forward: bool) -> bool {
        let sel = self.selection.clamped(&self.markup);
        let range = if !sel.is_empty() {
            sel.range()
        } else if forward {
            if sel.head >= self.markup.len() {
                return false;
            }
            sel.head..next_grapheme_boundary(&self.markup, sel.head)
        } else {
            if sel.head == 0 {
                return false;
            }
            prev_grapheme_boundary(&self.markup, sel.head)..sel.head
        };
        self.checkpoint();
        let start = range.start;
        self.markup.replace_range(range, "");
        self.selection = Selection::caret(start);
        true
    }

    fn apply(&mut self, command: RichCommand) -> bool {
        match command {
            RichCommand::Undo => {
                let Some(previous) = self.undo_stack.pop() else {
                    return false;
                };
                let current = self.snapshot();
                self.redo_stack.push(current);
                self.restore(previous);
                true
            }
            RichCommand::Redo => {
                let Some(next) = self.redo_stack.pop() else {
                    return false;
                };
                let current = self.snapshot();
                self.undo_stack.push(current);
                self.restore(next);
                true
            }
            RichCommand::Delete => self.delete(false),
            RichCommand::ForwardDelete => self.delete(true),
            RichCommand::InsertText(text) => {
                self.checkpoint();
                self.replace_selection(&escape_text(&text));
                true
            }
            RichCommand::InsertHtml(html) => {
                self.checkpoint();
                self.replace_selection(&html);
                true
            }
            RichCommand::Bold => self.wrap_command("<b>", "</b>"),
            RichCommand::Italic => self.wrap_command("<i>", "</i>"),
            RichCommand::Underline => self.wrap_command("<u>", "</u>"),
            RichCommand::Justify(alignment) => self.wrap_command(
                &format!("<div style=\"text-align: {}\">", alignment.css()),
                "</div>",
            ),
            RichCommand::UnorderedList => self.wrap_command("<ul><li>", "</li></ul>"),
            RichCommand::OrderedList => self.wrap_command("<ol><li>", "</li></ol>"),
            RichCommand::CreateLink(url) => {
                if self.selection.is_empty() {
                    // Without a selection the link text is the URL itself
                    self.checkpoint();
                    let escaped = escape_text(&url);
                    let link = format!("<a href=\"{}\">{}</a>", escaped, escaped);
                    self.replace_selection(&link);
                    true
                } else {
                    self.wrap_command(&format!("<a href=\"{}\">", escape_text(&url)), "</a>")
                }
            }
            RichCommand::FormatBlock(tag) => {
                self.wrap_command(&format!("<{}>", tag), &format!("</{}>", tag))
            }
        }
    }

    fn wrap_command(&mut self, open: &str, close: &str) -> bool {
        self.checkpoint();
        self.wrap_selection(open, close);
        true
    }
}

impl RichTextSurface for MarkupSurface {
    fn load(&mut self, markup: &str) {
        self.markup = markup.to_string();
        self.selection = Selection::caret(0);
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn markup(&self) -> &str {
        &self.markup
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamped(&self.markup);
    }

    fn exec(&mut self, command: &str, value: Option<&str>) -> bool {
        match RichCommand::parse(command, value) {
            Some(parsed) => self.apply(parsed),
            None => {
                tracing::debug!("Ignoring rich-text command {:?} ({:?})", command, value);
                false
            }
        }
    }

    fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}
