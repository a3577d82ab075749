//! The single editable document and its file binding.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default base name for a new document
pub const DEFAULT_FILE_NAME: &str = "untitled";

/// Default extension for a new document (always includes the leading dot)
pub const DEFAULT_FILE_EXTENSION: &str = ".txt";

/// How `Document::content` is interpreted and edited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    /// Raw text, edited directly with snapshot undo
    #[default]
    Plain,
    /// HTML markup, edited through the rich-text surface
    Rich,
}

impl EditorMode {
    /// Infer the mode from a file extension (with or without the leading dot).
    /// Letter case is ignored, as in the open filter.
    pub fn for_extension(extension: &str) -> Self {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "html" | "htm" => EditorMode::Rich,
            _ => EditorMode::Plain,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            EditorMode::Plain => EditorMode::Rich,
            EditorMode::Rich => EditorMode::Plain,
        }
    }

    /// Stable name used by the persistence store and keybinding `when` clauses
    pub fn as_str(self) -> &'static str {
        match self {
            EditorMode::Plain => "plain",
            EditorMode::Rich => "rich",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "plain" | "txt" => Some(EditorMode::Plain),
            "rich" | "html" => Some(EditorMode::Rich),
            _ => None,
        }
    }
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission to write back to a specific file without asking again
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBinding {
    path: PathBuf,
}

impl FileBinding {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Split a base name into `(stem, extension)` where the extension keeps its dot.
///
/// Returns `None` when the name has no usable extension: no dot at all, or a
/// leading dot only (`.bashrc`).
pub fn split_file_name(name: &str) -> Option<(&str, &str)> {
    let dot = name.rfind('.')?;
    if dot == 0 {
        return None;
    }
    Some((&name[..dot], &name[dot..]))
}

/// The single editable unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub content: String,
    pub mode: EditorMode,
    pub file_name: String,
    pub file_extension: String,
    pub binding: Option<FileBinding>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_NAME, DEFAULT_FILE_EXTENSION)
    }
}

impl Document {
    /// Create an empty plain document with the given default name
    pub fn new(file_name: &str, file_extension: &str) -> Self {
        Self {
            content: String::new(),
            mode: EditorMode::Plain,
            file_name: file_name.to_string(),
            file_extension: file_extension.to_string(),
            binding: None,
        }
    }

    /// Full file name, e.g. `notes.txt`
    pub fn full_name(&self) -> String {
        format!("{}{}", self.file_name, self.file_extension)
    }

    /// Adopt name, extension and mode from a loaded file's base name.
    ///
    /// Returns false (and changes nothing) when the name has no extension.
    pub fn adopt_name(&mut self, base_name: &str) -> bool {
        let Some((stem, extension)) = split_file_name(base_name) else {
            return false;
        };
        self.file_name = stem.to_string();
        self.file_extension = extension.to_string();
        self.mode = EditorMode::for_extension(extension);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_for_extension() {
        assert_eq!(EditorMode::for_extension(".html"), EditorMode::Rich);
        assert_eq!(EditorMode::for_extension(".HTM"), EditorMode::Rich);
        assert_eq!(EditorMode::for_extension(".txt"), EditorMode::Plain);
        assert_eq!(EditorMode::for_extension(".md"), EditorMode::Plain);
        assert_eq!(EditorMode::for_extension(""), EditorMode::Plain);
    }

    #[test]
    fn test_split_file_name() {
        assert_eq!(split_file_name("notes.txt"), Some(("notes", ".txt")));
        assert_eq!(split_file_name("archive.tar.gz"), Some(("archive.tar", ".gz")));
        assert_eq!(split_file_name("notes"), None);
        assert_eq!(split_file_name(".bashrc"), None);
    }

    #[test]
    fn test_adopt_name() {
        let mut doc = Document::default();
        assert!(doc.adopt_name("page.html"));
        assert_eq!(doc.full_name(), "page.html");
        assert_eq!(doc.mode, EditorMode::Rich);

        assert!(!doc.adopt_name("README"));
        assert_eq!(doc.full_name(), "page.html");
        assert_eq!(doc.mode, EditorMode::Rich);
    }

    #[test]
    fn test_mode_round_trip_names() {
        for mode in [EditorMode::Plain, EditorMode::Rich] {
            assert_eq!(EditorMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(EditorMode::parse("html"), Some(EditorMode::Rich));
        assert_eq!(EditorMode::parse("bogus"), None);
    }
}
