//! Modal single-line prompts and the file picker built on them.

use crate::model::document::split_file_name;
use crate::services::fs::{is_accepted_extension, FilePicker, SaveRequest};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::io;
use std::path::{Path, PathBuf};

/// Editable single-line input
#[derive(Debug, Clone)]
pub struct Prompt {
    /// The prompt message (e.g., "Open: ")
    pub message: String,
    /// User's current input
    pub input: String,
    /// Cursor position in the input (byte offset)
    pub cursor_pos: usize,
}

/// What a key press did to a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Pending,
    Submit(String),
    Cancel,
}

impl Prompt {
    pub fn new(message: impl Into<String>, initial: impl Into<String>) -> Self {
        let input = initial.into();
        Self {
            message: message.into(),
            cursor_pos: input.len(),
            input,
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> PromptOutcome {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => return PromptOutcome::Cancel,
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => return PromptOutcome::Cancel,
            (KeyCode::Enter, _) => return PromptOutcome::Submit(self.input.clone()),
            (KeyCode::Char(c), m) if m.is_empty() || m == KeyModifiers::SHIFT => {
                self.input.insert(self.cursor_pos, c);
                self.cursor_pos += c.len_utf8();
            }
            (KeyCode::Backspace, _) => {
                if let Some(c) = self.input[..self.cursor_pos].chars().next_back() {
                    self.cursor_pos -= c.len_utf8();
                    self.input.remove(self.cursor_pos);
                }
            }
            (KeyCode::Delete, _) => {
                if self.cursor_pos < self.input.len() {
                    self.input.remove(self.cursor_pos);
                }
            }
            (KeyCode::Left, _) => {
                if let Some(c) = self.input[..self.cursor_pos].chars().next_back() {
                    self.cursor_pos -= c.len_utf8();
                }
            }
            (KeyCode::Right, _) => {
                if let Some(c) = self.input[self.cursor_pos..].chars().next() {
                    self.cursor_pos += c.len_utf8();
                }
            }
            (KeyCode::Home, _) => self.cursor_pos = 0,
            (KeyCode::End, _) => self.cursor_pos = self.input.len(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.input.drain(..self.cursor_pos);
                self.cursor_pos = 0;
            }
            _ => {}
        }
        PromptOutcome::Pending
    }
}

/// Something that can ask the user for a line of text
pub trait UserPrompt {
    /// Returns `Ok(None)` when the user cancels
    fn ask(&mut self, message: &str, initial: &str) -> io::Result<Option<String>>;
}

/// [`FilePicker`] driven by line prompts.
///
/// Relative paths are resolved against `base_dir`. The open prompt only
/// accepts the configured extensions; a rejected choice is reported through
/// [`PromptPicker::take_notice`].
pub struct PromptPicker<'a> {
    prompt: &'a mut dyn UserPrompt,
    accepted: &'a [String],
    base_dir: &'a Path,
    notice: Option<String>,
}

impl<'a> PromptPicker<'a> {
    pub fn new(prompt: &'a mut dyn UserPrompt, accepted: &'a [String], base_dir: &'a Path) -> Self {
        Self {
            prompt,
            accepted,
            base_dir,
            notice: None,
        }
    }

    /// Message explaining why the last pick was refused
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    fn resolve(&self, input: &str) -> PathBuf {
        let path = PathBuf::from(input.trim());
        if path.is_absolute() {
            path
        } else {
            self.base_dir.join(path)
        }
    }

    fn initial_dir(&self) -> String {
        let mut dir = self.base_dir.display().to_string();
        if !dir.ends_with(std::path::MAIN_SEPARATOR) {
            dir.push(std::path::MAIN_SEPARATOR);
        }
        dir
    }
}

impl FilePicker for PromptPicker<'_> {
    fn pick_open(&mut self) -> io::Result<Option<PathBuf>> {
        let initial = self.initial_dir();
        let Some(input) = self.prompt.ask("Open: ", &initial)? else {
            return Ok(None);
        };
        if input.trim().is_empty() {
            return Ok(None);
        }
        let path = self.resolve(&input);
        if !is_accepted_extension(&path, self.accepted) {
            tracing::info!("Refusing to open {}: unsupported type", path.display());
            self.notice = Some(format!(
                "Unsupported file type (accepted: {})",
                self.accepted.join(", ")
            ));
            return Ok(None);
        }
        Ok(Some(path))
    }

    fn save_dialog(&mut self, name: &str, extension: &str) -> io::Result<Option<SaveRequest>> {
        let initial = format!("{}{}", name, extension);
        let Some(input) = self.prompt.ask("Save as: ", &initial)? else {
            return Ok(None);
        };
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }
        // A name typed without an extension keeps the current one
        Ok(Some(match split_file_name(input) {
            Some((stem, ext)) => SaveRequest::new(stem, ext),
            None => SaveRequest::new(input, extension),
        }))
    }

    fn pick_save(&mut self, suggested_name: &str) -> io::Result<Option<PathBuf>> {
        let initial = format!("{}{}", self.initial_dir(), suggested_name);
        let Some(input) = self.prompt.ask("Save to: ", &initial)? else {
            return Ok(None);
        };
        if input.trim().is_empty() {
            return Ok(None);
        }
        let path = self.resolve(&input);
        if path.exists() {
            let answer = self
                .prompt
                .ask(&format!("{} exists. Overwrite? (y/N): ", path.display()), "")?;
            let confirmed = matches!(answer.as_deref().map(str::trim), Some("y" | "Y" | "yes"));
            if !confirmed {
                return Ok(None);
            }
        }
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use tempfile::TempDir;

    /// Answers prompts from a script; `None` entries cancel
    struct Scripted(VecDeque<Option<String>>, Vec<String>);

    impl Scripted {
        fn new(answers: &[Option<&str>]) -> Self {
            Self(
                answers.iter().map(|a| a.map(str::to_string)).collect(),
                Vec::new(),
            )
        }
    }

    impl UserPrompt for Scripted {
        fn ask(&mut self, message: &str, _initial: &str) -> io::Result<Option<String>> {
            self.1.push(message.to_string());
            Ok(self.0.pop_front().flatten())
        }
    }

    fn exts() -> Vec<String> {
        vec!["txt".to_string(), "html".to_string()]
    }

    #[test]
    fn test_prompt_editing() {
        let mut prompt = Prompt::new("Open: ", "ab");
        prompt.handle_key(&KeyEvent::new(KeyCode::Left, KeyModifiers::NONE));
        prompt.handle_key(&KeyEvent::new(KeyCode::Char('é'), KeyModifiers::NONE));
        assert_eq!(prompt.input, "aéb");
        prompt.handle_key(&KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(prompt.input, "ab");
        assert_eq!(
            prompt.handle_key(&KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            PromptOutcome::Submit("ab".to_string())
        );
        assert_eq!(
            prompt.handle_key(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
            PromptOutcome::Cancel
        );
    }

    #[test]
    fn test_open_rejects_unaccepted_extension() {
        let dir = TempDir::new().unwrap();
        let accepted = exts();
        let mut script = Scripted::new(&[Some("image.png")]);
        let mut picker = PromptPicker::new(&mut script, &accepted, dir.path());
        assert_eq!(picker.pick_open().unwrap(), None);
        assert!(picker.take_notice().unwrap().contains("Unsupported"));
    }

    #[test]
    fn test_open_resolves_relative_path() {
        let dir = TempDir::new().unwrap();
        let accepted = exts();
        let mut script = Scripted::new(&[Some("notes.txt")]);
        let mut picker = PromptPicker::new(&mut script, &accepted, dir.path());
        assert_eq!(
            picker.pick_open().unwrap(),
            Some(dir.path().join("notes.txt"))
        );
    }

    #[test]
    fn test_save_dialog_splits_name() {
        let dir = TempDir::new().unwrap();
        let accepted = exts();
        let mut script = Scripted::new(&[Some("report.html"), Some("draft"), None]);
        let mut picker = PromptPicker::new(&mut script, &accepted, dir.path());
        assert_eq!(
            picker.save_dialog("untitled", ".txt").unwrap(),
            Some(SaveRequest::new("report", ".html"))
        );
        assert_eq!(
            picker.save_dialog("untitled", ".txt").unwrap(),
            Some(SaveRequest::new("draft", ".txt"))
        );
        assert_eq!(picker.save_dialog("untitled", ".txt").unwrap(), None);
    }

    #[test]
    fn test_pick_save_asks_before_overwrite() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "old").unwrap();
        let accepted = exts();
        let mut script = Scripted::new(&[Some("a.txt"), Some("n"), Some("a.txt"), Some("y")]);
        {
            let mut picker = PromptPicker::new(&mut script, &accepted, dir.path());
            assert_eq!(picker.pick_save("a.txt").unwrap(), None);
            assert_eq!(
                picker.pick_save("a.txt").unwrap(),
                Some(dir.path().join("a.txt"))
            );
        }
        assert_eq!(script.1.len(), 4);
    }
}
