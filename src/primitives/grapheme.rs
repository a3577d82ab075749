//! Grapheme cluster boundaries over `&str` byte offsets.
//!
//! A visible character may span several code points (combining marks,
//! emoji sequences), so cursor movement steps over whole clusters.

use unicode_segmentation::{GraphemeCursor, UnicodeSegmentation};

/// Byte offset of the grapheme boundary before `pos` (0 at the start)
pub fn prev_grapheme_boundary(text: &str, pos: usize) -> usize {
    let pos = floor_char_boundary(text, pos);
    let mut cursor = GraphemeCursor::new(pos, text.len(), true);
    match cursor.prev_boundary(text, 0) {
        Ok(Some(boundary)) => boundary,
        _ => 0,
    }
}

/// Byte offset of the grapheme boundary after `pos` (`text.len()` at the end)
pub fn next_grapheme_boundary(text: &str, pos: usize) -> usize {
    let pos = floor_char_boundary(text, pos);
    let mut cursor = GraphemeCursor::new(pos, text.len(), true);
    match cursor.next_boundary(text, 0) {
        Ok(Some(boundary)) => boundary,
        _ => text.len(),
    }
}

/// Largest char boundary `<= pos`, clamped to the text length
pub fn floor_char_boundary(text: &str, pos: usize) -> usize {
    if pos >= text.len() {
        return text.len();
    }
    let mut pos = pos;
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Number of grapheme clusters in `text`
pub fn grapheme_count(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Byte offset of the `n`th grapheme in `text`, or its length if shorter
pub fn grapheme_offset(text: &str, n: usize) -> usize {
    text.grapheme_indices(true)
        .nth(n)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}
