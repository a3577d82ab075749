//! Opening the document as an HTML page in a browser.

use std::io;
#[cfg(feature = "runtime")]
use std::path::{Path, PathBuf};

#[cfg(feature = "runtime")]
use tempfile::TempPath;

/// Opens markup in a new browsing context
pub trait PreviewBrowser {
    fn open_html(&mut self, html: &str) -> io::Result<()>;
}

/// Writes the markup to a temp `.html` file and hands it to the system's
/// default browser.
///
/// Only the latest preview file is kept: it is removed when the next
/// preview is written or when the browser is dropped.
#[cfg(feature = "runtime")]
pub struct SystemBrowser {
    dir: PathBuf,
    launch: fn(&Path) -> io::Result<()>,
    current: Option<TempPath>,
}

#[cfg(feature = "runtime")]
impl SystemBrowser {
    pub fn new() -> Self {
        Self::with_launcher(std::env::temp_dir(), |path| open::that_detached(path))
    }

    /// Write previews into `dir` and open them with `launch`
    pub fn with_launcher(dir: PathBuf, launch: fn(&Path) -> io::Result<()>) -> Self {
        Self {
            dir,
            launch,
            current: None,
        }
    }

    /// The preview file currently on disk
    pub fn current(&self) -> Option<&Path> {
        self.current.as_deref()
    }
}

#[cfg(feature = "runtime")]
impl Default for SystemBrowser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "runtime")]
impl PreviewBrowser for SystemBrowser {
    fn open_html(&mut self, html: &str) -> io::Result<()> {
        use std::io::Write;

        let mut file = tempfile::Builder::new()
            .prefix("teditor-preview-")
            .suffix(".html")
            .tempfile_in(&self.dir)?;
        file.write_all(html.as_bytes())?;
        let path = file.into_temp_path();
        tracing::info!("Opening preview {}", path.display());
        (self.launch)(&path)?;
        // Dropping the previous TempPath removes its file
        self.current = Some(path);
        Ok(())
    }
}

/// Records previews instead of opening them
#[derive(Debug, Default, Clone)]
pub struct RecordingBrowser {
    pub pages: Vec<String>,
}

impl PreviewBrowser for RecordingBrowser {
    fn open_html(&mut self, html: &str) -> io::Result<()> {
        self.pages.push(html.to_string());
        Ok(())
    }
}
