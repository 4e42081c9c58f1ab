use thiserror::Error;

/// Top-level error type for the Sillage service.
#[derive(Debug, Error)]
pub enum SillageError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("API request failed: {0}")]
    ApiRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited: retry after {retry_after_secs:?}s")]
    RateLimited { retry_after_secs: Option<u64> },
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    Transport(String),

    #[error("Invalid search response: {0}")]
    InvalidResponse(String),

    #[error("Search unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task already exists: {0}")]
    AlreadyExists(String),

    #[error("Task not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, SillageError>;
