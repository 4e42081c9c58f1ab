use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single raw result from the web search provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub body: String,
    pub url: String,
}

/// Trait for web search providers.
///
/// "No results" is an empty `Vec`, not an error; `Err` is reserved for
/// transport or protocol failures. Callers degrade gracefully on `Err`.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Execute a search, returning at most `limit` hits.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;
}
