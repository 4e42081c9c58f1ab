use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use sillage_core::model::{CompletionModel, CompletionRequest, complete_json};

use crate::types::{Recommendation, SearchFinding};

/// Upper bound on recommendations per task.
pub const MAX_RECOMMENDATIONS: usize = 5;

/// How much of a completion error to surface in fallback reasoning.
const ERROR_SNIPPET_LEN: usize = 50;

const ANALYZER_INSTRUCTIONS: &str = "You are a perfume expert analyzing web research results to recommend fragrances.

Based on the search results provided, identify and recommend 3-5 specific perfumes that match the user's preferences.

IMPORTANT: You MUST always provide at least 1 recommendation. If the search results don't contain specific perfumes, recommend well-known classics that match the requested fragrance notes.

For each recommendation, provide:
- Name: The exact perfume name (e.g., \"Bleu de Chanel\")
- Brand: The brand/house name (e.g., \"Chanel\")
- Notes: Key fragrance notes, comma-separated (e.g., \"bergamot, cedar, sandalwood\")
- reasoning: Brief explanation of why this matches the user's preferences

Be specific with perfume names. Never return an empty recommendations list.";

/// Well-known classics by note keyword: (keyword, name, brand, notes).
/// First keyword contained in any requested note wins.
const FALLBACKS: &[(&str, &str, &str, &str)] = &[
    ("vanilla", "Black Opium", "Yves Saint Laurent", "vanilla, coffee, white flowers"),
    ("rose", "Portrait of a Lady", "Frederic Malle", "rose, oud, incense"),
    ("oud", "Oud Wood", "Tom Ford", "oud, sandalwood, vetiver"),
    ("citrus", "Acqua di Gio", "Giorgio Armani", "bergamot, neroli, green tangerine"),
    ("woody", "Santal 33", "Le Labo", "sandalwood, cedar, cardamom"),
    ("musk", "Glossier You", "Glossier", "musk, ambrette, iris"),
    ("floral", "Miss Dior", "Dior", "rose, peony, lily of the valley"),
];

#[derive(Debug, Deserialize)]
struct RecommendationOutput {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Brand")]
    brand: String,
    #[serde(rename = "Notes")]
    notes: String,
    reasoning: String,
}

#[derive(Debug, Deserialize)]
struct AnalysisOutput {
    #[serde(default)]
    recommendations: Vec<RecommendationOutput>,
}

fn analysis_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "recommendations": {
                "type": "array",
                "maxItems": MAX_RECOMMENDATIONS,
                "items": {
                    "type": "object",
                    "properties": {
                        "Name": {"type": "string"},
                        "Brand": {"type": "string"},
                        "Notes": {"type": "string"},
                        "reasoning": {"type": "string"}
                    },
                    "required": ["Name", "Brand", "Notes", "reasoning"]
                }
            }
        },
        "required": ["recommendations"]
    })
}

/// Synthesizes search findings into fragrance recommendations.
pub struct Analyzer {
    model: Arc<dyn CompletionModel>,
}

impl Analyzer {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    /// Produce 1-5 recommendations. This never fails: a completion error
    /// or an empty reply both route to the rule-based fallback, so a task
    /// that reaches analysis always completes with at least one result.
    pub async fn analyze(
        &self,
        notes: &[String],
        preferences: &str,
        findings: &[SearchFinding],
    ) -> Vec<Recommendation> {
        let mut context = String::new();
        for finding in findings {
            context.push_str(&format!("Search: {}\n", finding.query));
            context.push_str(&format!("Summary: {}\n\n", finding.summary));
        }

        let prompt = format!(
            "User wants perfumes with these fragrance notes: {}\nAdditional preferences: {}\n\nResearch findings:\n{}\nBased on this research, recommend 3-5 specific perfumes that match.",
            notes.join(", "),
            if preferences.is_empty() { "None specified" } else { preferences },
            context
        );

        let request = CompletionRequest::new(prompt).with_system(ANALYZER_INSTRUCTIONS);
        let result: Result<AnalysisOutput, _> = complete_json(
            self.model.as_ref(),
            &request,
            "recommendations",
            analysis_schema(),
        )
        .await;

        let mut recommendations = match result {
            Ok(analysis) => analysis
                .recommendations
                .into_iter()
                .map(|rec| {
                    Recommendation::new(rec.name, rec.brand, rec.notes)
                        .with_reasoning(rec.reasoning)
                })
                .collect::<Vec<_>>(),
            Err(e) => {
                warn!(error = %e, "analysis completion failed, using fallback");
                return fallback_recommendations(notes, Some(&e.to_string()));
            }
        };

        if recommendations.is_empty() {
            warn!("analysis returned no recommendations, using fallback");
            return fallback_recommendations(notes, None);
        }

        recommendations.truncate(MAX_RECOMMENDATIONS);
        recommendations
    }
}

/// Exactly one rule-based recommendation, keyword-matched against the
/// requested notes. `error` is embedded (truncated) for observability.
fn fallback_recommendations(notes: &[String], error: Option<&str>) -> Vec<Recommendation> {
    let notes_str = notes.join(", ");
    let reason = match error {
        Some(e) => {
            let snippet: String = e.chars().take(ERROR_SNIPPET_LEN).collect();
            format!("Could not complete full research ({snippet}...). Suggesting classics with {notes_str}")
        }
        None => format!("Based on your interest in {notes_str} notes"),
    };

    for note in notes {
        let note_lower = note.to_lowercase();
        for (keyword, name, brand, note_list) in FALLBACKS {
            if note_lower.contains(keyword) {
                return vec![Recommendation::new(*name, *brand, *note_list).with_reasoning(reason)];
            }
        }
    }

    vec![
        Recommendation::new("Bleu de Chanel", "Chanel", "bergamot, mint, cedar, sandalwood")
            .with_reasoning(reason),
    ]
}
