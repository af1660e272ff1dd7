//! Quality reference endpoints.

use std::sync::Arc;

use crate::{error::Result, http::Http};
use roster_types::Quality;

const ENDPOINT: &str = "quality/";

/// Read access to the quality reference collection.
///
/// Qualities are small lookup records; client-side caching with a freshness
/// window lives in the store, not here.
pub struct QualityService {
    http: Arc<Http>,
}

impl QualityService {
    pub(crate) fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// Fetches the full quality list.
    pub async fn fetch_all(&self) -> Result<Vec<Quality>> {
        Ok(self.http.get(ENDPOINT).await?.content)
    }
}
