pub mod error;
pub mod model;
pub mod search;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ModelError, Result, SearchError, SillageError, TaskError};
    pub use crate::model::{
        CallOptions, CompletionModel, CompletionRequest, ResponseFormat, complete_json,
    };
    pub use crate::search::{SearchHit, SearchProvider};
}
