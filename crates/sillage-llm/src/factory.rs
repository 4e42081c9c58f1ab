use sillage_core::model::CompletionModel;

use crate::gemini::GeminiChatModel;
use crate::groq::GroqChatModel;
use crate::provider::Provider;

/// Create a CompletionModel instance for the given provider.
pub fn create_completion_model(
    provider: &Provider,
    api_key: String,
    model_id: String,
) -> Box<dyn CompletionModel> {
    match provider {
        Provider::Groq => Box::new(GroqChatModel::new(api_key, model_id)),
        Provider::Gemini => Box::new(GeminiChatModel::new(api_key, model_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_groq_model() {
        let model = create_completion_model(
            &Provider::Groq,
            "key".into(),
            "llama-3.3-70b-versatile".into(),
        );
        assert_eq!(model.model_name(), "llama-3.3-70b-versatile");
    }

    #[test]
    fn create_gemini_model() {
        let model =
            create_completion_model(&Provider::Gemini, "key".into(), "gemini-2.0-flash".into());
        assert_eq!(model.model_name(), "gemini-2.0-flash");
    }
}
