use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use sillage_research::types::{Recommendation, TaskStatus};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/research/start", post(start_research))
        .route("/research/status/{task_id}", get(get_status))
        .route("/research/cancel/{task_id}", post(cancel_research))
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    task_id: String,
    status: TaskStatus,
    progress: u8,
    message: String,
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recommendations: Option<Vec<Recommendation>>,
}

/// Start a new deep research task.
///
/// The body is validated by hand rather than through a typed extractor so
/// that a missing or mistyped `notes` field maps to 400, matching the
/// boundary contract consumed by existing clients.
async fn start_research(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
    let items = match body.get("notes").and_then(|v| v.as_array()) {
        Some(items) if !items.is_empty() => items,
        _ => return Err(AppError::BadRequest("notes array is required".into())),
    };

    let mut notes = Vec::with_capacity(items.len());
    for item in items {
        match item.as_str() {
            Some(s) => notes.push(s.to_string()),
            None => return Err(AppError::BadRequest("notes must be strings".into())),
        }
    }

    let preferences = body
        .get("preferences")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let task_id = Uuid::new_v4().to_string();
    state
        .store
        .create(&task_id, notes.clone(), preferences.clone())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    state.runner.launch(task_id.clone(), notes, preferences);
    tracing::info!(task_id, "research task started");

    Ok(Json(json!({
        "task_id": task_id,
        "status": "pending",
        "message": "Research task started"
    })))
}

/// Get status of a research task.
async fn get_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    let task = state
        .store
        .get(&task_id)
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(Json(StatusResponse {
        task_id: task.task_id,
        status: task.status,
        progress: task.progress,
        message: task.message,
        error: task.error,
        recommendations: task.recommendations,
    }))
}

/// Cancel a running research task. In-flight work is not interrupted;
/// the terminal record simply rejects any late pipeline writes.
async fn cancel_research(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if state.store.cancel(&task_id) {
        Ok(Json(json!({"message": "Task cancelled"})))
    } else {
        Err(AppError::BadRequest(
            "Task not found or already completed".into(),
        ))
    }
}
