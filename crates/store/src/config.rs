//! Store configuration.

use std::time::Duration;

/// Default freshness window for the qualities cache (10 minutes).
const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(10 * 60);

/// Configuration for the state store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Minimum age of the qualities cache before a re-fetch is issued.
    pub(crate) freshness_window: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { freshness_window: DEFAULT_FRESHNESS_WINDOW }
    }
}

impl StoreConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the qualities freshness window.
    ///
    /// Default: 10 minutes.
    #[must_use]
    pub fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }

    /// Returns the qualities freshness window.
    #[must_use]
    pub fn freshness_window(&self) -> Duration {
        self.freshness_window
    }
}
