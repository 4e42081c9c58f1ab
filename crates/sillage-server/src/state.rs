use std::sync::Arc;

use sillage_core::model::CompletionModel;
use sillage_core::search::SearchProvider;
use sillage_research::runner::TaskRunner;
use sillage_research::store::TaskStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TaskStore>,
    pub runner: Arc<TaskRunner>,
}

impl AppState {
    pub fn new(model: Arc<dyn CompletionModel>, provider: Arc<dyn SearchProvider>) -> Self {
        let store = Arc::new(TaskStore::new());
        let runner = Arc::new(TaskRunner::new(store.clone(), model, provider));
        Self { store, runner }
    }
}
