//! Selection ranges and cursor movement shared by both editing modes.

use crate::primitives::grapheme::{
    floor_char_boundary, grapheme_count, grapheme_offset, next_grapheme_boundary,
    prev_grapheme_boundary,
};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Direction of a cursor move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorDirection {
    /// Start of the buffer
    Start,
    Left,
    Up,
    Down,
    Right,
    /// End of the buffer
    End,
}

/// A selection as byte offsets into the text. Collapsed when `anchor == head`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn caret(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// Clamp both ends into `text`, snapping to character boundaries
    pub fn clamped(&self, text: &str) -> Self {
        Self {
            anchor: floor_char_boundary(text, self.anchor),
            head: floor_char_boundary(text, self.head),
        }
    }

    /// The selected slice of `text` (empty when collapsed)
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        let sel = self.clamped(text);
        &text[sel.range()]
    }

    /// Selection covering the whole of `text`
    pub fn all(text: &str) -> Self {
        Self::new(0, text.len())
    }
}

/// Compute the head position after moving from `pos` in `direction`.
///
/// Left/right step over one grapheme cluster, up/down keep the visual column
/// (in graphemes) clamped to the target line, start/end jump to the buffer
/// boundaries.
pub fn move_position(text: &str, pos: usize, direction: CursorDirection) -> usize {
    let pos = floor_char_boundary(text, pos);
    match direction {
        CursorDirection::Start => 0,
        CursorDirection::End => text.len(),
        CursorDirection::Left => prev_grapheme_boundary(text, pos),
        CursorDirection::Right => next_grapheme_boundary(text, pos),
        CursorDirection::Up => {
            let line_start = line_start(text, pos);
            if line_start == 0 {
                return pos;
            }
            let column = grapheme_count(&text[line_start..pos]);
            let prev_start = self::line_start(text, line_start - 1);
            offset_in_line(text, prev_start, column)
        }
        CursorDirection::Down => {
            let Some(next_start) = next_line_start(text, pos) else {
                return pos;
            };
            let column = grapheme_count(&text[line_start(text, pos)..pos]);
            offset_in_line(text, next_start, column)
        }
    }
}

/// Apply a move to a selection. Collapsing moves drop the anchor; extending
/// moves keep it.
pub fn move_selection(
    text: &str,
    selection: Selection,
    direction: CursorDirection,
    extend: bool,
) -> Selection {
    let head = move_position(text, selection.head, direction);
    if extend {
        Selection::new(selection.anchor, head)
    } else {
        Selection::caret(head)
    }
}

/// Byte offset of the start of the line containing `pos`
pub fn line_start(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// Byte offset of the end of the line containing `pos`: the start of its
/// terminator (`\n` or `\r\n`) or EOF
pub fn line_end(text: &str, pos: usize) -> usize {
    match text[pos..].find('\n') {
        Some(i) => {
            let newline = pos + i;
            if newline > pos && text.as_bytes()[newline - 1] == b'\r' {
                newline - 1
            } else {
                newline
            }
        }
        None => text.len(),
    }
}

/// Byte offset of the start of the line after the one containing `pos`
fn next_line_start(text: &str, pos: usize) -> Option<usize> {
    text[pos..].find('\n').map(|i| pos + i + 1)
}

/// Zero-based `(line, grapheme column)` of `pos`
pub fn line_col(text: &str, pos: usize) -> (usize, usize) {
    let pos = floor_char_boundary(text, pos);
    let line = text[..pos].matches('\n').count();
    let column = grapheme_count(&text[line_start(text, pos)..pos]);
    (line, column)
}

fn offset_in_line(text: &str, start: usize, column: usize) -> usize {
    let end = line_end(text, start);
    start + grapheme_offset(&text[start..end], column)
}
