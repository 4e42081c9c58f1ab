use std::sync::Arc;

use tracing::error;

use sillage_core::model::CompletionModel;
use sillage_core::search::SearchProvider;

use crate::orchestrator::Orchestrator;
use crate::store::TaskStore;

/// Launches research pipelines on the runtime's worker pool, decoupled
/// from the HTTP request that created the task.
///
/// Each launch runs in its own spawned task, so a panic in one pipeline
/// is contained by the task boundary and cannot affect siblings or the
/// request path. A supervising task watches the pipeline's join handle;
/// if the pipeline dies outside the orchestrator's own fail path, the
/// supervisor writes the failed state, so no task is left non-terminal.
pub struct TaskRunner {
    store: Arc<TaskStore>,
    model: Arc<dyn CompletionModel>,
    provider: Arc<dyn SearchProvider>,
}

impl TaskRunner {
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

    /// Fire-and-forget: start the pipeline for a task and return
    /// immediately.
    pub fn launch(&self, task_id: String, notes: Vec<String>, preferences: String) {
        let orchestrator =
            Orchestrator::new(self.store.clone(), self.model.clone(), self.provider.clone());
        let store = self.store.clone();
        let watched_id = task_id.clone();

        tokio::spawn(async move {
            let pipeline = tokio::spawn(async move {
                orchestrator.run(&task_id, notes, preferences).await;
            });

            if let Err(join_err) = pipeline.await {
                error!(task_id = %watched_id, error = %join_err, "research pipeline aborted");
                store.fail(
                    &watched_id,
                    &format!("research pipeline aborted: {join_err}"),
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSearchProvider;
    use crate::types::TaskStatus;
    use async_trait::async_trait;
    use sillage_core::error::Result;
    use sillage_core::model::{CallOptions, CompletionRequest};
    use sillage_llm::mock::MockCompletionModel;
    use std::time::Duration;

    /// Poll the store until the task reaches a terminal state.
    async fn wait_for_terminal(store: &TaskStore, task_id: &str) -> TaskStatus {
        for _ in 0..200 {
            if let Some(task) = store.get(task_id)
                && task.status.is_terminal()
            {
                return task.status;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("task {task_id} never reached a terminal state");
    }

    fn plan_reply() -> String {
        serde_json::json!({
            "search_tasks": [{"query": "q", "focus": "f"}],
            "reasoning": "r"
        })
        .to_string()
    }

    fn analysis_reply() -> String {
        serde_json::json!({
            "recommendations": [{
                "Name": "Santal 33", "Brand": "Le Labo",
                "Notes": "sandalwood, cedar", "reasoning": "fits"
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn launch_returns_immediately_and_completes_in_background() {
        let store = Arc::new(TaskStore::new());
        store
            .create("t1", vec!["woody".into()], String::new())
            .unwrap();

        let model = Arc::new(MockCompletionModel::with_script(vec![
            Ok(plan_reply()),
            Ok("summary".into()),
            Ok(analysis_reply()),
        ]));
        let runner = TaskRunner::new(store.clone(), model, Arc::new(MockSearchProvider::empty()));

        runner.launch("t1".into(), vec!["woody".into()], String::new());

        assert_eq!(wait_for_terminal(&store, "t1").await, TaskStatus::Completed);
        assert_eq!(store.get("t1").unwrap().progress, 100);
    }

    #[tokio::test]
    async fn launch_reaches_failed_on_pipeline_error() {
        let store = Arc::new(TaskStore::new());
        store
            .create("t1", vec!["woody".into()], String::new())
            .unwrap();

        let model = Arc::new(MockCompletionModel::failing("provider down"));
        let runner = TaskRunner::new(store.clone(), model, Arc::new(MockSearchProvider::empty()));

        runner.launch("t1".into(), vec!["woody".into()], String::new());

        assert_eq!(wait_for_terminal(&store, "t1").await, TaskStatus::Failed);
        assert!(store.get("t1").unwrap().error.unwrap().contains("provider down"));
    }

    /// A model that panics, simulating a fault escaping the orchestrator's
    /// error handling entirely.
    struct PanickingModel;

    #[async_trait]
    impl CompletionModel for PanickingModel {
        async fn complete(
            &self,
            _request: &CompletionRequest,
            _options: &CallOptions,
        ) -> Result<String> {
            panic!("model blew up");
        }

        fn model_name(&self) -> &str {
            "panicking-model"
        }
    }

    #[tokio::test]
    async fn panic_in_pipeline_is_contained_and_task_fails() {
        let store = Arc::new(TaskStore::new());
        store
            .create("t1", vec!["woody".into()], String::new())
            .unwrap();

        let runner = TaskRunner::new(
            store.clone(),
            Arc::new(PanickingModel),
            Arc::new(MockSearchProvider::empty()),
        );

        runner.launch("t1".into(), vec!["woody".into()], String::new());

        assert_eq!(wait_for_terminal(&store, "t1").await, TaskStatus::Failed);
        let task = store.get("t1").unwrap();
        assert!(task.error.unwrap().contains("aborted"));
    }
}
