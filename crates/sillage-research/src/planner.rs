use std::sync::Arc;

use serde::Deserialize;

use sillage_core::error::Result;
use sillage_core::model::{CompletionModel, CompletionRequest, complete_json};

use crate::types::{ResearchPlan, SearchDirective};

/// Upper bound on directives per plan.
pub const MAX_DIRECTIVES: usize = 4;

const PLANNER_INSTRUCTIONS: &str = "You are a perfume research planner. Given fragrance notes and optional preferences,
create a focused search plan to find the best perfume recommendations.

Generate exactly 3-4 specific search queries that will help find:
1. Perfumes featuring the specified notes prominently
2. Expert reviews and fragrance community recommendations
3. Similar fragrances from well-known brands

Each search should have a clear focus area. Be specific and include the fragrance notes in queries.";

/// Structured output expected from the planning completion.
#[derive(Debug, Deserialize)]
struct PlanOutput {
    search_tasks: Vec<SearchDirective>,
    reasoning: String,
}

fn plan_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "search_tasks": {
                "type": "array",
                "maxItems": MAX_DIRECTIVES,
                "items": {
                    "type": "object",
                    "properties": {
                        "query": {"type": "string"},
                        "focus": {"type": "string"}
                    },
                    "required": ["query", "focus"]
                }
            },
            "reasoning": {"type": "string"}
        },
        "required": ["search_tasks", "reasoning"]
    })
}

/// Creates a research plan from the user's fragrance notes.
pub struct Planner {
    model: Arc<dyn CompletionModel>,
}

impl Planner {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    /// Plan 1-4 search directives. A completion error propagates; an
    /// empty-but-valid reply falls back to templated directives.
    pub async fn plan(&self, notes: &[String], preferences: &str) -> Result<ResearchPlan> {
        let notes_str = notes.join(", ");
        let mut query = format!("Find perfumes with these fragrance notes: {notes_str}");
        if !preferences.is_empty() {
            query.push_str(&format!(". Additional preferences: {preferences}"));
        }

        let request = CompletionRequest::new(&query).with_system(PLANNER_INSTRUCTIONS);
        let output: PlanOutput =
            complete_json(self.model.as_ref(), &request, "research_plan", plan_schema()).await?;

        let mut directives = output.search_tasks;
        if directives.is_empty() {
            tracing::warn!("planner returned no directives, using templated fallback");
            directives = fallback_directives(notes);
        }
        directives.truncate(MAX_DIRECTIVES);

        Ok(ResearchPlan {
            original_query: query,
            directives,
            reasoning: output.reasoning,
        })
    }
}

fn fallback_directives(notes: &[String]) -> Vec<SearchDirective> {
    let notes_str = notes.join(", ");
    let first_note = notes.first().map(String::as_str).unwrap_or("perfume");
    vec![
        SearchDirective {
            query: format!("best perfumes with {notes_str} notes"),
            focus: "fragrance notes match".into(),
        },
        SearchDirective {
            query: format!("{notes_str} fragrance recommendations 2024"),
            focus: "recent recommendations".into(),
        },
        SearchDirective {
            query: format!("top rated {first_note} perfumes reviews"),
            focus: "expert reviews".into(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use sillage_llm::mock::MockCompletionModel;

    fn notes(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn plan_reply(count: usize) -> String {
        let tasks: Vec<serde_json::Value> = (0..count)
            .map(|i| {
                serde_json::json!({
                    "query": format!("query {i}"),
                    "focus": format!("focus {i}")
                })
            })
            .collect();
        serde_json::json!({"search_tasks": tasks, "reasoning": "cover notes and reviews"})
            .to_string()
    }

    #[tokio::test]
    async fn plan_returns_model_directives() {
        let model = Arc::new(MockCompletionModel::replying(plan_reply(3)));
        let planner = Planner::new(model);

        let plan = planner
            .plan(&notes(&["vanilla", "rose"]), "summer scent")
            .await
            .unwrap();

        assert_eq!(plan.directives.len(), 3);
        assert!(plan.original_query.contains("vanilla, rose"));
        assert!(plan.original_query.contains("summer scent"));
        assert_eq!(plan.reasoning, "cover notes and reviews");
    }

    #[tokio::test]
    async fn plan_without_preferences_omits_suffix() {
        let model = Arc::new(MockCompletionModel::replying(plan_reply(1)));
        let planner = Planner::new(model);

        let plan = planner.plan(&notes(&["oud"]), "").await.unwrap();
        assert!(!plan.original_query.contains("Additional preferences"));
    }

    #[tokio::test]
    async fn empty_reply_falls_back_to_three_directives() {
        let model = Arc::new(MockCompletionModel::replying(plan_reply(0)));
        let planner = Planner::new(model);

        let plan = planner.plan(&notes(&["vanilla"]), "").await.unwrap();
        assert_eq!(plan.directives.len(), 3);
        assert!(plan.directives[0].query.contains("vanilla"));
        assert_eq!(plan.directives[2].focus, "expert reviews");
    }

    #[tokio::test]
    async fn oversized_reply_truncated_to_four() {
        let model = Arc::new(MockCompletionModel::replying(plan_reply(6)));
        let planner = Planner::new(model);

        let plan = planner.plan(&notes(&["musk"]), "").await.unwrap();
        assert_eq!(plan.directives.len(), MAX_DIRECTIVES);
    }

    #[tokio::test]
    async fn completion_error_propagates() {
        let model = Arc::new(MockCompletionModel::failing("TimeoutError: x"));
        let planner = Planner::new(model);

        let result = planner.plan(&notes(&["vanilla"]), "").await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("TimeoutError: x"));
    }

    #[tokio::test]
    async fn malformed_reply_is_an_error_not_a_fallback() {
        let model = Arc::new(MockCompletionModel::replying("not json"));
        let planner = Planner::new(model);

        let result = planner.plan(&notes(&["vanilla"]), "").await;
        assert!(result.is_err());
    }
}
