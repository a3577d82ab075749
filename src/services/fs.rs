//! File selection and file I/O capabilities.
//!
//! [`FilePicker`] is the user-facing half (choose a file, fill in the
//! save dialog); [`FileSystem`] does the actual reads and writes. Both are
//! injected into the controller so tests can script them.

use std::io;
use std::path::{Path, PathBuf};

/// Name and extension entered in the save dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub name: String,
    pub extension: String,
}

impl SaveRequest {
    pub fn new(name: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extension: extension.into(),
        }
    }
}

/// User-driven file selection. `Ok(None)` means the user cancelled.
pub trait FilePicker {
    /// Choose an existing file to open
    fn pick_open(&mut self) -> io::Result<Option<PathBuf>>;

    /// The save-as form: name and extension, pre-filled with the current values
    fn save_dialog(&mut self, name: &str, extension: &str) -> io::Result<Option<SaveRequest>>;

    /// Choose where to write a file, pre-filled with `suggested_name`
    fn pick_save(&mut self, suggested_name: &str) -> io::Result<Option<PathBuf>>;
}

/// Reads and writes document files
pub trait FileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Whether files can be written to a user-chosen location. When false,
    /// saving falls back to [`FileSystem::download`].
    fn supports_direct_write(&self) -> bool;

    /// Deliver `content` as a download named `file_name`; returns where it
    /// ended up.
    fn download(&self, file_name: &str, content: &str) -> io::Result<PathBuf>;
}

/// `std::fs` backed file system
#[derive(Debug, Clone)]
pub struct StdFileSystem {
    direct_write: bool,
    download_dir: PathBuf,
}

impl StdFileSystem {
    pub fn new(direct_write: bool, download_dir: PathBuf) -> Self {
        Self {
            direct_write,
            download_dir,
        }
    }

    /// The platform downloads directory, falling back to the temp dir
    pub fn default_download_dir() -> PathBuf {
        dirs::download_dir().unwrap_or_else(std::env::temp_dir)
    }

    /// Pick a path in the download dir that doesn't overwrite an existing
    /// file: `name.txt`, `name (1).txt`, `name (2).txt`, ...
    fn unique_download_path(&self, file_name: &str) -> PathBuf {
        let candidate = self.download_dir.join(file_name);
        if !candidate.exists() {
            return candidate;
        }
        let (stem, extension) = crate::model::document::split_file_name(file_name)
            .unwrap_or((file_name, ""));
        (1..)
            .map(|n| self.download_dir.join(format!("{} ({}){}", stem, n, extension)))
            .find(|path| !path.exists())
            .unwrap_or(candidate)
    }
}

impl Default for StdFileSystem {
    fn default() -> Self {
        Self::new(true, Self::default_download_dir())
    }
}

impl FileSystem for StdFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = std::fs::read(path)?;
        // Non-UTF-8 input is decoded lossily rather than refused
        Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn supports_direct_write(&self) -> bool {
        self.direct_write
    }

    fn download(&self, file_name: &str, content: &str) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.download_dir)?;
        let path = self.unique_download_path(file_name);
        std::fs::write(&path, content)?;
        Ok(path)
    }
}

/// Whether `path` has one of the accepted extensions (compared without the
/// leading dot, case-insensitively). An empty accept list accepts anything.
pub fn is_accepted_extension(path: &Path, accepted: &[String]) -> bool {
    if accepted.is_empty() {
        return true;
    }
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    accepted
        .iter()
        .any(|a| a.trim_start_matches('.').eq_ignore_ascii_case(ext))
}
