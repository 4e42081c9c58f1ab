use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{Duration, Utc};

use sillage_core::error::{Result, TaskError};

use crate::types::{Recommendation, TaskRecord, TaskStatus};

/// In-memory store for research tasks.
///
/// One coarse `std::sync::Mutex` guards the whole table. Operations are
/// O(1) and never await or call each other while holding the lock, so the
/// store is safe from any thread or runtime, not just tokio tasks.
/// Terminal records (completed/failed/cancelled) reject further mutation,
/// which is what lets a concurrent cancel win against a late pipeline write.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Mutex<HashMap<String, TaskRecord>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> MutexGuard<'_, HashMap<String, TaskRecord>> {
        // A poisoned lock only means another thread panicked mid-update of
        // a single record; the table itself is still usable.
        self.tasks.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create a new task in the pending state.
    pub fn create(
        &self,
        task_id: &str,
        notes: Vec<String>,
        preferences: String,
    ) -> Result<TaskRecord> {
        let mut tasks = self.locked();
        if tasks.contains_key(task_id) {
            return Err(TaskError::AlreadyExists(task_id.into()).into());
        }
        let now = Utc::now();
        let record = TaskRecord {
            task_id: task_id.into(),
            notes,
            preferences,
            status: TaskStatus::Pending,
            progress: 0,
            message: "Task created, waiting to start...".into(),
            recommendations: None,
            error: None,
            created_at: now,
            updated_at: now,
        };
        tasks.insert(task_id.into(), record.clone());
        Ok(record)
    }

    /// Snapshot of a task, if present.
    pub fn get(&self, task_id: &str) -> Option<TaskRecord> {
        self.locked().get(task_id).cloned()
    }

    /// Update phase progress. A no-op when the task is absent or already
    /// terminal; pipeline updates must never resurrect a finished task.
    pub fn update(&self, task_id: &str, status: TaskStatus, progress: u8, message: &str) {
        let mut tasks = self.locked();
        if let Some(task) = tasks.get_mut(task_id)
            && !task.status.is_terminal()
        {
            task.status = status;
            task.progress = progress;
            task.message = message.into();
            task.updated_at = Utc::now();
        }
    }

    /// Mark a task completed with its recommendations.
    pub fn complete(&self, task_id: &str, recommendations: Vec<Recommendation>) {
        let mut tasks = self.locked();
        if let Some(task) = tasks.get_mut(task_id)
            && !task.status.is_terminal()
        {
            task.status = TaskStatus::Completed;
            task.progress = 100;
            task.message = format!("Found {} recommendations", recommendations.len());
            task.recommendations = Some(recommendations);
            task.updated_at = Utc::now();
        }
    }

    /// Mark a task failed with the given error text.
    pub fn fail(&self, task_id: &str, error: &str) {
        let mut tasks = self.locked();
        if let Some(task) = tasks.get_mut(task_id)
            && !task.status.is_terminal()
        {
            task.status = TaskStatus::Failed;
            task.message = "Research failed".into();
            task.error = Some(error.into());
            task.updated_at = Utc::now();
        }
    }

    /// Cancel a task. Returns false when the task is absent or already
    /// terminal; cancellation does not interrupt in-flight work.
    pub fn cancel(&self, task_id: &str) -> bool {
        let mut tasks = self.locked();
        if let Some(task) = tasks.get_mut(task_id)
            && !task.status.is_terminal()
        {
            task.status = TaskStatus::Cancelled;
            task.message = "Task cancelled by user".into();
            task.updated_at = Utc::now();
            return true;
        }
        false
    }

    /// Remove tasks older than `max_age`. Returns the count removed.
    pub fn sweep(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let mut tasks = self.locked();
        let before = tasks.len();
        tasks.retain(|_, task| task.created_at >= cutoff);
        before - tasks.len()
    }
}
