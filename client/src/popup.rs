use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use common::{DocumentId, PopupKind, PopupState};
use crossbeam::channel::{Receiver, Sender, TrySendError};
use tracing::{debug, warn};

use crate::manager::DocumentManager;

/// A request for the popup subsystem to open something.
#[derive(Clone)]
pub enum PopupIntent {
    /// `manager` is `None` when the add control is clicked before the
    /// document manager has been instantiated.
    Document {
        state: PopupState,
        manager: Option<Arc<DocumentManager>>,
    },
    /// `popup_manager` points back at the dispatcher that received the
    /// intent. It is weak so a dispatcher that keeps intents does not keep
    /// itself alive.
    Clicked {
        id: DocumentId,
        popup_manager: Weak<dyn PopupDispatch>,
        manager: Arc<DocumentManager>,
    },
}

impl PopupIntent {
    pub fn kind(&self) -> PopupKind {
        match self {
            PopupIntent::Document { .. } => PopupKind::Document,
            PopupIntent::Clicked { .. } => PopupKind::Clicked,
        }
    }

    pub fn document_id(&self) -> Option<DocumentId> {
        match self {
            PopupIntent::Clicked { id, .. } => Some(*id),
            PopupIntent::Document { .. } => None,
        }
    }
}

impl fmt::Debug for PopupIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopupIntent::Document { state, manager } => f
                .debug_struct("Document")
                .field("state", state)
                .field("has_manager", &manager.is_some())
                .finish_non_exhaustive(),
            PopupIntent::Clicked { id, .. } => f
                .debug_struct("Clicked")
                .field("id", id)
                .finish_non_exhaustive(),
        }
    }
}

/// Fire-and-forget entry point of the popup subsystem.
pub trait PopupDispatch: Send + Sync {
    fn open(&self, intent: PopupIntent);
}

/// Keeps every intent it is given, in order.
#[derive(Default)]
pub struct RecordingPopups {
    opened: Mutex<Vec<PopupIntent>>,
}

impl RecordingPopups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<PopupIntent> {
        self.opened.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn count(&self, kind: PopupKind) -> usize {
        self.opened
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .filter(|intent| intent.kind() == kind)
            .count()
    }
}

impl PopupDispatch for RecordingPopups {
    fn open(&self, intent: PopupIntent) {
        debug!(kind = %intent.kind(), "popup requested");
        self.opened
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(intent);
    }
}

/// Hands intents to whoever drains the paired receiver.
///
/// A full or closed channel drops the intent: the page never waits on
/// the popup subsystem.
pub struct ChannelPopups {
    sender: Sender<PopupIntent>,
}

impl ChannelPopups {
    pub fn bounded(capacity: usize) -> (Self, Receiver<PopupIntent>) {
        let (sender, receiver) = crossbeam::channel::bounded(capacity);
        (Self { sender }, receiver)
    }
}

impl PopupDispatch for ChannelPopups {
    fn open(&self, intent: PopupIntent) {
        let kind = intent.kind();
        match self.sender.try_send(intent) {
            Ok(()) => debug!(%kind, "popup intent queued"),
            Err(TrySendError::Full(_)) => {
                warn!(%kind, "popup channel full, intent dropped");
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!(%kind, "popup channel closed, intent dropped");
            }
        }
    }
}
