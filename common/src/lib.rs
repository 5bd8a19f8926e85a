pub mod document;
pub use document::{Document, DocumentId, Version};

pub mod error;
pub use error::DocumentError;

pub mod popup;
pub use popup::{PopupKind, PopupState};

pub mod signal;
pub use signal::AuthSignal;
