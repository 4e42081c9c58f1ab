pub mod factory;
pub mod gemini;
pub mod groq;
pub mod mock;
pub mod provider;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::factory::create_completion_model;
    pub use crate::gemini::GeminiChatModel;
    pub use crate::groq::GroqChatModel;
    pub use crate::mock::MockCompletionModel;
    pub use crate::provider::Provider;
}
