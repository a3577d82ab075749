use crate::persistence::StoreError;
use crate::services::clipboard::ClipboardError;

/// Errors from buffer controller operations.
///
/// Platform failures never escape the controller's public operations: they
/// are logged and the operation becomes a no-op. The one exception is a
/// caller-side precondition (`InvalidExtension`), which `save_as` reports.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    #[error("extension must start with '.', got {0:?}")]
    InvalidExtension(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, EditorError>;
