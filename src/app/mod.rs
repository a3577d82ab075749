//! Terminal front end: event loop, action dispatch and modal prompts.

pub mod prompt;
pub mod render;

use crate::controller::{BufferController, SaveOutcome};
use crate::input::keybindings::{Action, KeybindingResolver};
use crate::model::document::EditorMode;
use crate::model::event::DocumentEvent;
use crate::model::selection::{line_col, line_start};
use crate::services::preview::PreviewBrowser;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use prompt::{Prompt, PromptOutcome, PromptPicker, UserPrompt};
use ratatui::buffer::Buffer;
use ratatui::DefaultTerminal;
use render::{display_col, Layout, Viewport};
use std::io;
use std::path::PathBuf;

/// The editor application: a buffer controller plus terminal UI state
pub struct App {
    controller: BufferController,
    keybindings: KeybindingResolver,
    browser: Box<dyn PreviewBrowser>,
    /// Extensions accepted by the open prompt
    open_extensions: Vec<String>,
    /// Directory relative prompt paths are resolved against
    base_dir: PathBuf,
    viewport: Viewport,
    /// Content changed since the document was loaded, reset or saved
    modified: bool,
    status: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(
        controller: BufferController,
        keybindings: KeybindingResolver,
        browser: Box<dyn PreviewBrowser>,
        open_extensions: Vec<String>,
        base_dir: PathBuf,
    ) -> Self {
        Self {
            controller,
            keybindings,
            browser,
            open_extensions,
            base_dir,
            viewport: Viewport::default(),
            modified: false,
            status: None,
            should_quit: false,
        }
    }

    pub fn controller(&self) -> &BufferController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut BufferController {
        &mut self.controller
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Run until the user quits
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        let mut last_frame = Buffer::empty(terminal.get_frame().area());
        while !self.should_quit {
            let body = Layout::new(terminal.get_frame().area()).body;
            self.scroll_to_caret(body.width, body.height);
            let status = match &self.status {
                Some(status) => status.clone(),
                None => self.key_hint(),
            };

            let completed = terminal.draw(|frame| {
                render::draw(
                    frame,
                    &self.controller,
                    &self.viewport,
                    self.modified,
                    Some(status.as_str()),
                )
            })?;
            last_frame.clone_from(completed.buffer);

            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let mut prompt = TerminalPrompt {
                        terminal: &mut *terminal,
                        background: &last_frame,
                    };
                    self.handle_key(&key, &mut prompt);
                }
                Event::Paste(text) => {
                    self.controller.insert_text(&text);
                    self.apply_events();
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Bound keys for the most common actions, shown when there is no status
    pub fn key_hint(&self) -> String {
        let mode = self.controller.mode();
        [
            (Action::Quit, "quit"),
            (Action::Save, "save"),
            (Action::ToggleMode, "toggle mode"),
        ]
        .iter()
        .filter_map(|(action, label)| {
            self.keybindings
                .find_keybinding_for_action(action, mode)
                .map(|key| format!("{} {}", key, label))
        })
        .collect::<Vec<_>>()
        .join("  ")
    }

    fn scroll_to_caret(&mut self, width: u16, height: u16) {
        let content = self.controller.content();
        let head = self.controller.selection().head.min(content.len());
        let (line, _) = line_col(content, head);
        let start = line_start(content, head);
        let col = display_col(&content[start..], head - start);
        self.viewport
            .scroll_to(line, col, width as usize, height as usize);
    }

    /// Resolve and run a key press
    pub fn handle_key(&mut self, key: &KeyEvent, prompt: &mut dyn UserPrompt) {
        let action = self.keybindings.resolve(key, self.controller.mode());
        if action != Action::None {
            tracing::debug!("Key {:?} -> {}", key.code, action.describe());
        }
        self.dispatch(action, prompt);
    }

    /// Drain the controller's change events into the view state
    fn apply_events(&mut self) {
        for event in self.controller.take_events() {
            match event {
                DocumentEvent::ContentChanged => self.modified = true,
                DocumentEvent::FileChanged => self.modified = false,
                DocumentEvent::Reset => {
                    self.modified = false;
                    self.viewport = Viewport::default();
                }
                DocumentEvent::ModeChanged { mode } => {
                    tracing::debug!("Mode changed to {}", mode.as_str());
                }
            }
        }
    }

    /// Run one action. Prompts (file choice, link URL) go through `prompt`.
    pub fn dispatch(&mut self, action: Action, prompt: &mut dyn UserPrompt) {
        self.run_action(action, prompt);
        self.apply_events();
    }

    fn run_action(&mut self, action: Action, prompt: &mut dyn UserPrompt) {
        let c = &mut self.controller;
        match action {
            Action::InsertChar(ch) => {
                c.insert_text(ch.encode_utf8(&mut [0; 4]));
            }
            Action::InsertNewline => {
                c.insert_text("\n");
            }
            Action::InsertTab => {
                c.insert_text("\t");
            }
            Action::DeleteBackward => {
                c.delete_backward();
            }
            Action::DeleteForward => {
                c.delete_forward();
            }

            Action::Move(direction) => c.move_cursor(direction),
            Action::Select(direction) => c.extend_selection(direction),
            Action::SelectAll => c.select_all(),

            Action::Copy => {
                let message = if c.copy() { "Copied" } else { "Copy failed" };
                self.set_status(message);
            }
            Action::Cut => {
                if c.cut() {
                    self.set_status("Cut");
                }
            }
            Action::Paste => {
                c.rich_paste();
            }
            Action::PastePlainText => {
                c.plain_text_paste();
            }

            Action::Undo => {
                if !c.undo() {
                    self.set_status("Nothing to undo");
                }
            }
            Action::Redo => {
                if !c.redo() {
                    self.set_status("Nothing to redo");
                }
            }

            Action::New => {
                c.new_document();
                self.set_status("New document");
            }
            Action::Open => self.open(prompt),
            Action::Save => {
                let mut picker = PromptPicker::new(prompt, &self.open_extensions, &self.base_dir);
                let outcome = self.controller.quick_save(&mut picker);
                self.report_save(outcome);
            }
            Action::SaveAs => {
                let mut picker = PromptPicker::new(prompt, &self.open_extensions, &self.base_dir);
                let outcome = self.controller.save_as_dialog(&mut picker);
                self.report_save(outcome);
            }

            Action::ToggleMode => {
                c.toggle_mode();
                self.report_mode();
            }
            Action::SetMode(mode) => {
                c.set_mode(mode);
                self.report_mode();
            }
            Action::Preview => {
                let message = if c.preview(self.browser.as_mut()) {
                    "Opened preview"
                } else {
                    "Preview failed"
                };
                self.set_status(message);
            }

            Action::Format { command, value } => {
                if c.mode() != EditorMode::Rich {
                    self.set_status("Formatting is available in rich mode");
                } else {
                    c.exec_format(&command, value.as_deref());
                }
            }
            Action::InsertLink => self.insert_link(prompt),

            Action::Quit => self.should_quit = true,
            Action::None => {}
        }
    }

    fn open(&mut self, prompt: &mut dyn UserPrompt) {
        let mut picker = PromptPicker::new(prompt, &self.open_extensions, &self.base_dir);
        let opened = self.controller.open_document(&mut picker);
        let notice = picker.take_notice();
        let message = match (opened, notice) {
            (true, _) => format!("Opened {}", self.controller.document().full_name()),
            (false, Some(notice)) => notice,
            (false, None) => "Nothing opened".to_string(),
        };
        self.set_status(message);
    }

    fn insert_link(&mut self, prompt: &mut dyn UserPrompt) {
        if self.controller.mode() != EditorMode::Rich {
            self.set_status("Links are available in rich mode");
            return;
        }
        match prompt.ask("Link URL: ", "https://") {
            Ok(Some(url)) => {
                self.controller.exec_format("createLink", Some(&url));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Link prompt failed: {}", e),
        }
    }

    fn report_save(&mut self, outcome: SaveOutcome) {
        let message = match outcome {
            SaveOutcome::Saved(path) => {
                self.modified = false;
                format!("Saved {}", path.display())
            }
            SaveOutcome::Downloaded(path) => format!("Downloaded to {}", path.display()),
            SaveOutcome::Cancelled => "Save cancelled".to_string(),
            SaveOutcome::Failed => "Save failed (see log)".to_string(),
        };
        self.set_status(message);
    }

    fn report_mode(&mut self) {
        let message = match self.controller.mode() {
            EditorMode::Plain => "Plain text mode",
            EditorMode::Rich => "Rich text mode",
        };
        self.set_status(message);
    }
}

/// Modal prompt on the status row. Blocks on terminal events until the user
/// submits or cancels.
pub struct TerminalPrompt<'a> {
    terminal: &'a mut DefaultTerminal,
    background: &'a Buffer,
}

impl UserPrompt for TerminalPrompt<'_> {
    fn ask(&mut self, message: &str, initial: &str) -> io::Result<Option<String>> {
        let mut prompt = Prompt::new(message, initial);
        loop {
            let background = self.background;
            self.terminal
                .draw(|frame| render::draw_prompt(frame, background, &prompt))?;
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match prompt.handle_key(&key) {
                    PromptOutcome::Pending => {}
                    PromptOutcome::Submit(input) => return Ok(Some(input)),
                    PromptOutcome::Cancel => return Ok(None),
                }
            }
        }
    }
}
