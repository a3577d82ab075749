//! Frame rendering: header, document body and status line.

use super::prompt::Prompt;
use crate::controller::BufferController;
use crate::model::document::EditorMode;
use crate::model::selection::{line_col, line_start};
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const TAB_WIDTH: usize = 4;

/// Display width of a grapheme, with tabs expanded to a fixed width
fn grapheme_width(g: &str) -> usize {
    if g == "\t" {
        TAB_WIDTH
    } else {
        g.width()
    }
}

/// Display column of byte offset `pos` within `line`
pub fn display_col(line: &str, pos: usize) -> usize {
    line[..pos.min(line.len())]
        .graphemes(true)
        .map(grapheme_width)
        .sum()
}

/// Scroll offsets of the document body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// First visible line
    pub top: usize,
    /// First visible display column
    pub left: usize,
}

impl Viewport {
    /// Scroll the minimum amount needed to show (`line`, `col`) in an area of
    /// `width` x `height` cells
    pub fn scroll_to(&mut self, line: usize, col: usize, width: usize, height: usize) {
        let height = height.max(1);
        let width = width.max(1);
        if line < self.top {
            self.top = line;
        } else if line >= self.top + height {
            self.top = line + 1 - height;
        }
        // Leave room for the caret after the last character
        if col < self.left {
            self.left = col;
        } else if col >= self.left + width {
            self.left = col + 1 - width;
        }
    }
}

/// The three rows of the editor layout
pub struct Layout {
    pub header: Rect,
    pub body: Rect,
    pub status: Rect,
}

impl Layout {
    pub fn new(area: Rect) -> Self {
        let header = Rect::new(area.x, area.y, area.width, area.height.min(1));
        let status_y = area.y + area.height.saturating_sub(1);
        let status = Rect::new(area.x, status_y, area.width, area.height.min(1));
        let body = Rect::new(
            area.x,
            area.y + 1,
            area.width,
            area.height.saturating_sub(2),
        );
        Self {
            header,
            body,
            status,
        }
    }
}

/// Draw the whole editor
pub fn draw(
    frame: &mut Frame,
    controller: &BufferController,
    viewport: &Viewport,
    modified: bool,
    status: Option<&str>,
) {
    let layout = Layout::new(frame.area());
    draw_header(frame, layout.header, controller, modified);
    if let Some(caret) = draw_body(frame, layout.body, controller, viewport) {
        frame.set_cursor_position(caret);
    }
    draw_status(frame, layout.status, controller, status);
}

fn draw_header(frame: &mut Frame, area: Rect, controller: &BufferController, modified: bool) {
    let document = controller.document();
    let mode_style = match document.mode {
        EditorMode::Plain => Style::new().black().on_cyan(),
        EditorMode::Rich => Style::new().black().on_magenta(),
    };
    let location = match controller.bound_path() {
        Some(path) => path.display().to_string(),
        None => "not saved to a file".to_string(),
    };
    let line = Line::from(vec![
        Span::styled(format!(" {} ", document.mode.as_str().to_uppercase()), mode_style),
        Span::raw(" "),
        Span::styled(document.full_name(), Style::new().bold()),
        Span::raw(if modified { " [+]  " } else { "  " }),
        Span::styled(location, Style::new().dark_gray()),
    ]);
    frame.render_widget(
        Paragraph::new(line).style(Style::new().bg(Color::Black)),
        area,
    );
}

/// Renders the visible lines and returns the caret's screen position
fn draw_body(
    frame: &mut Frame,
    area: Rect,
    controller: &BufferController,
    viewport: &Viewport,
) -> Option<Position> {
    let content = controller.content();
    let selection = controller.selection().clamped(content);
    let selected = selection.range();
    let width = area.width as usize;

    let mut lines = Vec::new();
    let mut offset = 0;
    for (index, text) in content.split('\n').enumerate() {
        // A CRLF terminator is not drawn
        let visible = text.strip_suffix('\r').unwrap_or(text);
        let line_range = offset..offset + visible.len();
        offset += text.len() + 1;
        if index < viewport.top {
            continue;
        }
        if lines.len() >= area.height as usize {
            break;
        }
        lines.push(render_line(visible, line_range, &selected, viewport.left, width));
    }

    frame.render_widget(Text::from(lines), area);

    let head = selection.head;
    let (line, _) = line_col(content, head);
    let start = line_start(content, head);
    let col = display_col(&content[start..], head - start);
    if line < viewport.top || col < viewport.left {
        return None;
    }
    let x = col - viewport.left;
    let y = line - viewport.top;
    if x >= width || y >= area.height as usize {
        return None;
    }
    Some(Position::new(area.x + x as u16, area.y + y as u16))
}

/// One document line clipped to `[left, left + width)` display columns, with
/// the selected part highlighted
fn render_line(
    text: &str,
    line_range: Range<usize>,
    selected: &Range<usize>,
    left: usize,
    width: usize,
) -> Line<'static> {
    let selected_style = Style::new().add_modifier(Modifier::REVERSED);
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_selected = false;
    let mut col = 0;

    for (i, g) in text.grapheme_indices(true) {
        let w = grapheme_width(g);
        if col + w <= left {
            col += w;
            continue;
        }
        if col >= left + width {
            break;
        }
        let pos = line_range.start + i;
        let is_selected = selected.start <= pos && pos < selected.end;
        if is_selected != run_selected && !run.is_empty() {
            spans.push(styled_run(std::mem::take(&mut run), run_selected, selected_style));
        }
        run_selected = is_selected;
        if g == "\t" {
            run.push_str(&" ".repeat(TAB_WIDTH));
        } else {
            run.push_str(g);
        }
        col += w;
    }
    // A selected newline shows as one highlighted cell
    let newline_selected = selected.start <= line_range.end && line_range.end < selected.end;
    if newline_selected && col >= left && col < left + width {
        if !run_selected && !run.is_empty() {
            spans.push(styled_run(std::mem::take(&mut run), false, selected_style));
        }
        run_selected = true;
        run.push(' ');
    }
    if !run.is_empty() {
        spans.push(styled_run(run, run_selected, selected_style));
    }
    Line::from(spans)
}

fn styled_run(text: String, selected: bool, selected_style: Style) -> Span<'static> {
    if selected {
        Span::styled(text, selected_style)
    } else {
        Span::raw(text)
    }
}

fn draw_status(
    frame: &mut Frame,
    area: Rect,
    controller: &BufferController,
    status: Option<&str>,
) {
    let content = controller.content();
    let (line, col) = line_col(content, controller.selection().head.min(content.len()));
    let flag = |on: bool| if on { "yes" } else { "no" };
    let right = format!(
        "Undo: {}  Redo: {}  Ln {}, Col {} ",
        flag(controller.can_undo()),
        flag(controller.can_redo()),
        line + 1,
        col + 1
    );
    let left = format!(" {}", status.unwrap_or_default());
    let padding = (area.width as usize).saturating_sub(left.width() + right.width());
    let line = Line::from(vec![
        Span::raw(left),
        Span::raw(" ".repeat(padding)),
        Span::raw(right),
    ]);
    frame.render_widget(
        Paragraph::new(line).style(Style::new().black().on_gray()),
        area,
    );
}

/// Draw a modal prompt on the status row over a snapshot of the last frame
pub fn draw_prompt(frame: &mut Frame, background: &Buffer, prompt: &Prompt) {
    frame.buffer_mut().merge(background);
    let area = Layout::new(frame.area()).status;
    let line = Line::from(vec![
        Span::styled(prompt.message.clone(), Style::new().bold()),
        Span::raw(prompt.input.clone()),
    ]);
    frame.render_widget(
        Paragraph::new(line).style(Style::new().white().on_blue()),
        area,
    );
    let x = prompt.message.width() + prompt.input[..prompt.cursor_pos].width();
    let x = (x as u16).min(area.width.saturating_sub(1));
    frame.set_cursor_position(Position::new(area.x + x, area.y));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::clipboard::MemoryClipboard;
    use crate::services::fs::StdFileSystem;
    use crate::services::rich_text::MarkupSurface;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn controller_with(text: &str) -> BufferController {
        let mut controller = BufferController::new(
            &Config::default(),
            Box::new(StdFileSystem::default()),
            Box::new(MemoryClipboard::new()),
            Box::new(MarkupSurface::new()),
        );
        controller.insert_text(text);
        controller
    }

    fn row(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol().to_string())
            .collect::<String>()
    }

    #[test]
    fn test_viewport_scrolls_minimally() {
        let mut viewport = Viewport::default();
        viewport.scroll_to(10, 0, 80, 5);
        assert_eq!(viewport.top, 6);
        viewport.scroll_to(7, 0, 80, 5);
        assert_eq!(viewport.top, 6);
        viewport.scroll_to(2, 100, 80, 5);
        assert_eq!(viewport, Viewport { top: 2, left: 21 });
    }

    #[test]
    fn test_display_col_expands_tabs_and_wide_chars() {
        assert_eq!(display_col("\tx", 1), TAB_WIDTH);
        assert_eq!(display_col("日本", "日".len()), 2);
    }

    #[test]
    fn test_draw_shows_header_body_and_status() {
        let controller = controller_with("hello\nworld");
        let mut terminal = Terminal::new(TestBackend::new(40, 5)).unwrap();
        terminal
            .draw(|frame| draw(frame, &controller, &Viewport::default(), false, Some("Saved")))
            .unwrap();
        let buffer = terminal.backend().buffer();
        assert!(row(buffer, 0).contains("PLAIN"));
        assert!(row(buffer, 0).contains("untitled.txt"));
        assert!(!row(buffer, 0).contains("[+]"));
        assert!(row(buffer, 1).starts_with("hello"));
        assert!(row(buffer, 2).starts_with("world"));
        assert!(row(buffer, 4).contains("Saved"));
        assert!(row(buffer, 4).contains("Undo: yes"));
    }

    #[test]
    fn test_selection_is_highlighted() {
        let mut controller = controller_with("abc");
        controller.select_all();
        let mut terminal = Terminal::new(TestBackend::new(20, 4)).unwrap();
        terminal
            .draw(|frame| draw(frame, &controller, &Viewport::default(), false, None))
            .unwrap();
        let buffer = terminal.backend().buffer();
        assert!(buffer[(0, 1)].modifier.contains(Modifier::REVERSED));
        assert!(!buffer[(3, 1)].modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn test_crlf_lines_hide_carriage_return() {
        let controller = controller_with("ab\r\ncd");
        let mut terminal = Terminal::new(TestBackend::new(10, 4)).unwrap();
        terminal
            .draw(|frame| draw(frame, &controller, &Viewport::default(), false, None))
            .unwrap();
        let buffer = terminal.backend().buffer();
        assert_eq!(row(buffer, 1), "ab        ");
        assert_eq!(row(buffer, 2), "cd        ");
    }

    #[test]
    fn test_modified_marker_in_header() {
        let controller = controller_with("abc");
        let mut terminal = Terminal::new(TestBackend::new(40, 4)).unwrap();
        terminal
            .draw(|frame| draw(frame, &controller, &Viewport::default(), true, None))
            .unwrap();
        assert!(row(terminal.backend().buffer(), 0).contains("untitled.txt [+]"));
    }
}
