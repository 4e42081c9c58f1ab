use std::sync::Arc;

use tracing::{error, info};

use sillage_core::error::Result;
use sillage_core::model::CompletionModel;
use sillage_core::search::SearchProvider;

use crate::analyzer::Analyzer;
use crate::planner::Planner;
use crate::searcher::Searcher;
use crate::store::TaskStore;
use crate::types::TaskStatus;

/// Drives one task through the planning → searching → analyzing sequence,
/// reporting progress to the store after each phase.
///
/// Single-pass and non-resumable: each task id runs the sequence exactly
/// once. Any stage error is converted into a terminal failed state here;
/// cancellation is not polled mid-flight — a cancelled record simply
/// rejects the pipeline's remaining writes.
pub struct Orchestrator {
    store: Arc<TaskStore>,
    model: Arc<dyn CompletionModel>,
    provider: Arc<dyn SearchProvider>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<TaskStore>,
        model: Arc<dyn CompletionModel>,
        provider: Arc<dyn SearchProvider>,
    ) -> Self {
        Self {
            store,
            model,
            provider,
        }
    }

    /// Execute the full research pipeline for a task. Infallible from the
    /// caller's perspective: errors land in the store as a failed state.
    pub async fn run(&self, task_id: &str, notes: Vec<String>, preferences: String) {
        info!(task_id, notes = ?notes, "starting research pipeline");
        if let Err(e) = self.run_pipeline(task_id, &notes, &preferences).await {
            error!(task_id, error = %e, "research pipeline failed");
            self.store.fail(task_id, &e.to_string());
        }
    }

    async fn run_pipeline(
        &self,
        task_id: &str,
        notes: &[String],
        preferences: &str,
    ) -> Result<()> {
        // Phase 1: planning
        self.store
            .update(task_id, TaskStatus::Planning, 10, "Creating search plan...");

        let planner = Planner::new(self.model.clone());
        let plan = planner.plan(notes, preferences).await?;

        // Phase 2: searching
        self.store.update(
            task_id,
            TaskStatus::Searching,
            30,
            &format!("Searching web ({} queries)...", plan.directives.len()),
        );

        let searcher = Searcher::new(self.model.clone(), self.provider.clone());
        let findings = searcher.search(&plan.directives).await;

        self.store.update(
            task_id,
            TaskStatus::Searching,
            60,
            &format!("Found {} results, analyzing...", findings.len()),
        );

        // Phase 3: analysis
        self.store.update(
            task_id,
            TaskStatus::Analyzing,
            75,
            "Analyzing results and generating recommendations...",
        );

        let analyzer = Analyzer::new(self.model.clone());
        let recommendations = analyzer.analyze(notes, preferences, &findings).await;

        self.store.complete(task_id, recommendations);
        info!(task_id, "research pipeline completed");
        Ok(())
    }
}
