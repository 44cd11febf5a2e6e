//! User-facing notifications (toasts).

use tokio::sync::mpsc;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// Neutral information.
    Info,
    /// A completed action.
    Success,
    /// A failure the user should see.
    Error,
}

/// One notification message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Severity.
    pub kind: ToastKind,
    /// Human-readable message.
    pub message: String,
}

impl Toast {
    /// An informational toast.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Info,
            message: message.into(),
        }
    }

    /// A success toast.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    /// An error toast.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }
}

/// Sender half of the notification stream.
///
/// Cheap to clone and hand to every producer; the consumer drains the
/// receiver returned by [`channel`](Self::channel). Pushing with no
/// consumer left is a silent no-op.
#[derive(Debug, Clone)]
pub struct NotifyStore {
    tx: mpsc::UnboundedSender<Toast>,
}

impl NotifyStore {
    /// Create a store and the receiver that drains it.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Toast>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Emit a toast.
    pub fn push(&self, toast: Toast) {
        let _ = self.tx.send(toast);
    }
}
