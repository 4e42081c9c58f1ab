use async_trait::async_trait;

use sillage_core::error::{Result, SearchError, SillageError};
use sillage_core::search::{SearchHit, SearchProvider};

/// Mock search provider for testing without HTTP.
pub struct MockSearchProvider {
    hits: Vec<SearchHit>,
    error: Option<String>,
}

impl MockSearchProvider {
    /// Every search returns clones of the given hits (capped at `limit`).
    pub fn with_hits(hits: Vec<SearchHit>) -> Self {
        Self { hits, error: None }
    }

    /// Every search returns no hits.
    pub fn empty() -> Self {
        Self {
            hits: Vec::new(),
            error: None,
        }
    }

    /// Every search fails with a transport error.
    pub fn failing(error_msg: impl Into<String>) -> Self {
        Self {
            hits: Vec::new(),
            error: Some(error_msg.into()),
        }
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        if let Some(msg) = &self.error {
            return Err(SillageError::Search(SearchError::Transport(msg.clone())));
        }
        Ok(self.hits.iter().take(limit).cloned().collect())
    }
}
