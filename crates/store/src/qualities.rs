//! Qualities slice: state, reducer, and selectors.
//!
//! Qualities are a small reference collection cached client-side; the
//! [`Store`](crate::store::Store) skips a re-fetch while the last successful
//! fetch is inside the configured freshness window.

use std::time::Duration;

use indexmap::IndexMap;
use roster_types::{Quality, QualityId};

use crate::{action::QualitiesAction, state::State};

/// State of the qualities slice.
#[derive(Debug, Clone, PartialEq)]
pub struct QualitiesState {
    /// Loaded qualities keyed by id, in server order.
    pub entities: Option<IndexMap<QualityId, Quality>>,

    /// A fetch is in flight. Starts true: the first load is expected
    /// immediately after startup.
    pub is_loading: bool,

    /// Last failure message, if any.
    pub error: Option<String>,

    /// Completion time of the last successful fetch, epoch milliseconds.
    pub last_fetch: Option<u64>,
}

impl Default for QualitiesState {
    fn default() -> Self {
        Self { entities: None, is_loading: true, error: None, last_fetch: None }
    }
}

impl QualitiesState {
    /// Whether the cached collection is still fresh as of `now_ms`.
    ///
    /// Never fresh before the first successful fetch.
    #[must_use]
    pub fn is_fresh(&self, now_ms: u64, window: Duration) -> bool {
        self.last_fetch
            .is_some_and(|fetched| now_ms.saturating_sub(fetched) < window.as_millis() as u64)
    }
}

/// Qualities reducer.
#[must_use]
pub fn reduce_qualities(state: &QualitiesState, action: QualitiesAction) -> QualitiesState {
    let mut next = state.clone();
    match action {
        QualitiesAction::Requested => {
            next.is_loading = true;
        }
        QualitiesAction::Received { qualities, fetched_at } => {
            next.entities = Some(
                qualities.into_iter().map(|quality| (quality.id.clone(), quality)).collect(),
            );
            next.is_loading = false;
            next.last_fetch = Some(fetched_at);
        }
        QualitiesAction::RequestFailed { message } => {
            next.error = Some(message);
            next.is_loading = false;
        }
    }
    next
}

// ============================================================================
// Selectors
// ============================================================================

impl State {
    /// Loaded qualities in server order, if fetched.
    #[must_use]
    pub fn qualities(&self) -> Option<&IndexMap<QualityId, Quality>> {
        self.qualities.entities.as_ref()
    }

    /// Looks up a quality by id.
    #[must_use]
    pub fn quality_by_id(&self, id: &QualityId) -> Option<&Quality> {
        self.qualities.entities.as_ref()?.get(id)
    }

    /// Resolves a set of ids to qualities, keeping the order of `ids` and
    /// skipping ids that are not loaded.
    #[must_use]
    pub fn qualities_by_ids<'a>(&'a self, ids: &[QualityId]) -> Vec<&'a Quality> {
        ids.iter().filter_map(|id| self.quality_by_id(id)).collect()
    }

    /// Whether a qualities fetch is in flight.
    #[must_use]
    pub fn qualities_loading(&self) -> bool {
        self.qualities.is_loading
    }
}
