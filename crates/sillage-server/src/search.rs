//! Web search provider backed by the Tavily API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use sillage_core::error::{Result, SearchError, SillageError};
use sillage_core::search::{SearchHit, SearchProvider};

const TAVILY_API_URL: &str = "https://api.tavily.com/search";

#[derive(Serialize)]
struct TavilyRequest {
    api_key: String,
    query: String,
    search_depth: String,
    max_results: usize,
}

#[derive(Deserialize)]
struct TavilyResponse {
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    title: String,
    url: String,
    content: String,
}

/// Search client for the Tavily API.
///
/// The API key is optional: without one every search fails with
/// `SearchError::Unavailable`, which the pipeline degrades to empty
/// results rather than failing the task. Only LLM credentials are
/// required to run the service.
pub struct TavilySearchClient {
    api_key: Option<String>,
    client: reqwest::Client,
}

impl TavilySearchClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("TAVILY_API_KEY").ok().filter(|k| !k.is_empty()))
    }
}

#[async_trait]
impl SearchProvider for TavilySearchClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            SillageError::Search(SearchError::Unavailable(
                "TAVILY_API_KEY environment variable not set".into(),
            ))
        })?;

        let request = TavilyRequest {
            api_key: api_key.clone(),
            query: query.to_string(),
            search_depth: "basic".into(),
            max_results: limit,
        };

        let response = self
            .client
            .post(TAVILY_API_URL)
            .json(&request)
            .send()
            .await
            .map_err(|e| SillageError::Search(SearchError::Transport(e.to_string())))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SillageError::Search(SearchError::Transport(format!(
                "Tavily API error ({status}): {body}"
            ))));
        }

        let tavily_resp: TavilyResponse = response
            .json()
            .await
            .map_err(|e| SillageError::Search(SearchError::InvalidResponse(e.to_string())))?;

        Ok(tavily_resp
            .results
            .into_iter()
            .take(limit)
            .map(|r| SearchHit {
                title: r.title,
                body: r.content,
                url: r.url,
            })
            .collect())
    }
}
