use std::sync::Arc;

use futures::future;
use tracing::warn;

use sillage_core::error::Result;
use sillage_core::model::{CallOptions, CompletionModel, CompletionRequest};
use sillage_core::search::{SearchHit, SearchProvider};

use crate::types::{SearchDirective, SearchFinding};

/// Raw hits requested from the provider per directive.
pub const MAX_RESULTS_PER_SEARCH: usize = 8;

const SUMMARIZER_INSTRUCTIONS: &str = "You are a perfume expert analyzing search results.
Summarize the key information about perfumes found in these search results.
Focus on:
- Specific perfume names and brands mentioned
- Fragrance notes described
- User reviews and ratings
- Price range if mentioned

Be concise but include specific product names.";

/// Executes web searches and summarizes results.
pub struct Searcher {
    model: Arc<dyn CompletionModel>,
    provider: Arc<dyn SearchProvider>,
}

impl Searcher {
    pub fn new(model: Arc<dyn CompletionModel>, provider: Arc<dyn SearchProvider>) -> Self {
        Self { model, provider }
    }

    /// Execute all directives concurrently. Failed units are dropped, so
    /// the returned findings may number fewer than the directives; this
    /// method itself never fails.
    pub async fn search(&self, directives: &[SearchDirective]) -> Vec<SearchFinding> {
        let units = directives.iter().map(|d| self.search_and_summarize(d));
        future::join_all(units)
            .await
            .into_iter()
            .zip(directives)
            .filter_map(|(result, directive)| match result {
                Ok(finding) => Some(finding),
                Err(e) => {
                    warn!(query = %directive.query, error = %e, "search unit failed, dropping");
                    None
                }
            })
            .collect()
    }

    /// Execute a single directive: provider search, then one summary call.
    async fn search_and_summarize(&self, directive: &SearchDirective) -> Result<SearchFinding> {
        let hits = match self
            .provider
            .search(&directive.query, MAX_RESULTS_PER_SEARCH)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                // Provider trouble degrades to an empty result block; the
                // summary call still runs so the finding survives.
                warn!(query = %directive.query, error = %e, "search provider failed");
                Vec::new()
            }
        };

        let results_text = format_hits(&hits);
        let prompt = format!(
            "Search query: {}\nFocus area: {}\n\nSearch results:\n{}\n\nSummarize the perfume-related information found.",
            directive.query, directive.focus, results_text
        );

        let request = CompletionRequest::new(prompt).with_system(SUMMARIZER_INSTRUCTIONS);
        let summary = self.model.complete(&request, &CallOptions::default()).await?;

        Ok(SearchFinding {
            query: directive.query.clone(),
            results: hits,
            summary,
        })
    }
}

fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No search results found.".into();
    }
    let mut formatted = String::new();
    for (i, hit) in hits.iter().enumerate() {
        formatted.push_str(&format!(
            "{}. {}\n   {}\n   URL: {}\n\n",
            i + 1,
            hit.title,
            hit.body,
            hit.url
        ));
    }
    formatted
}
