use crate::model::document::{Document, EditorMode};

/// Change notifications emitted by the buffer controller after a mutation.
///
/// Observers (the view, the persistence mirror) re-read whatever they need
/// from the document passed alongside the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// `content` changed (edit, paste, cut, undo/redo, load)
    ContentChanged,
    /// The editing mode switched
    ModeChanged { mode: EditorMode },
    /// File name, extension or binding changed
    FileChanged,
    /// The document was reset by "new file"
    Reset,
}

/// Subscriber to controller change events
pub trait DocumentObserver {
    fn on_event(&mut self, event: &DocumentEvent, document: &Document);
}

/// Records every event it sees until drained with [`EventLog::take`]
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<DocumentEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: DocumentEvent) {
        self.events.push(event);
    }

    pub fn take(&mut self) -> Vec<DocumentEvent> {
        std::mem::take(&mut self.events)
    }
}

impl DocumentObserver for EventLog {
    fn on_event(&mut self, event: &DocumentEvent, _document: &Document) {
        self.push(event.clone());
    }
}
