use std::fmt;

/// Popups this page knows how to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PopupKind {
    /// Create/edit form for a document.
    Document,
    /// Details of a document that was clicked.
    Clicked,
}

impl PopupKind {
    pub fn name(&self) -> &'static str {
        match self {
            PopupKind::Document => "document-popup",
            PopupKind::Clicked => "clicked-popup",
        }
    }
}

impl fmt::Display for PopupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mode the document popup opens in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupState {
    Add,
}
