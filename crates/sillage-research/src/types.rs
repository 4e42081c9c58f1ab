use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sillage_core::search::SearchHit;

/// Status of a research task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Planning,
    Searching,
    Analyzing,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    /// Terminal states accept no further mutation.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }
}

/// A research task record. Owned by the `TaskStore`; callers get clones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: String,
    pub notes: Vec<String>,
    pub preferences: String,
    pub status: TaskStatus,
    pub progress: u8,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<Recommendation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single search directive produced by the planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDirective {
    pub query: String,
    /// What aspect to focus on (e.g. "fragrance notes", "brand reviews").
    pub focus: String,
}

/// Output of the planning phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchPlan {
    pub original_query: String,
    pub directives: Vec<SearchDirective>,
    pub reasoning: String,
}

/// The result of executing one directive: raw hits plus an LLM summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchFinding {
    pub query: String,
    pub results: Vec<SearchHit>,
    pub summary: String,
}

/// A perfume recommendation. Field casing on the wire matches the
/// original save format consumed by downstream clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Brand")]
    pub brand: String,
    /// Key fragrance notes, comma-separated.
    #[serde(rename = "Notes")]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Confidence score in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl Recommendation {
    pub fn new(
        name: impl Into<String>,
        brand: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            brand: brand.into(),
            notes: notes.into(),
            source_url: None,
            confidence: None,
            reasoning: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }
}
