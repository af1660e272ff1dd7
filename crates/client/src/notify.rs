//! User-facing notification seam.
//!
//! Unexpected failures (5xx, transport errors) are reported to the user as a
//! generic notification rather than surfaced to callers. The sink is an
//! injected capability so tests can observe what would have been shown.

use parking_lot::Mutex;

/// Sink for user-facing error notifications (toast equivalent).
pub trait Notifier: Send + Sync {
    /// Shows an error notification to the user.
    fn error(&self, message: &str);
}

/// Default notifier: routes notifications into the tracing log.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        tracing::warn!(message, "user-facing error notification");
    }
}

/// Test notifier recording every message it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all messages recorded so far.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.messages.lock().push(message.to_owned());
    }
}
