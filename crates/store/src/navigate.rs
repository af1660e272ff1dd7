//! Client-side navigation seam.
//!
//! Successful login/logout/update thunks trigger redirects. The target is an
//! injected capability so the store stays independent of any UI router and
//! tests can observe where the app would have navigated.

use parking_lot::Mutex;

/// Sink for client-side navigation side effects.
pub trait Navigator: Send + Sync {
    /// Navigates to the given path.
    fn push(&self, path: &str);
}

/// Default navigator: records navigations in the tracing log only.
#[derive(Debug, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn push(&self, path: &str) {
        tracing::debug!(path, "navigation requested");
    }
}

/// Test navigator capturing every pushed path.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all paths pushed so far.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn push(&self, path: &str) {
        self.paths.lock().push(path.to_owned());
    }
}
