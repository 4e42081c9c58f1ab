use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Desired response format for structured output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Free-form text (default, equivalent to omitting the field).
    Text,
    /// Force JSON output conforming to a schema.
    JsonSchema {
        name: String,
        schema: serde_json::Value,
    },
}

/// Options controlling a completion invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallOptions {
    /// Maximum tokens to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature (0.0 - 2.0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Structured output format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// A single completion request: fixed instructions plus the user prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System-level instructions, applied before the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// The user-facing prompt text.
    pub prompt: String,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Trait for LLM completion providers.
///
/// Implementations handle API communication, request formatting, and
/// response parsing for a specific provider. Failures are ordinary
/// `ModelError` values; callers decide whether to propagate or recover.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Generate a completion for the given request.
    async fn complete(&self, request: &CompletionRequest, options: &CallOptions)
    -> Result<String>;

    /// Return the model name/identifier.
    fn model_name(&self) -> &str;
}

/// Run a schema-constrained completion and parse the reply into `T`.
///
/// The schema is forwarded to the provider as a structured-output format;
/// a reply that does not parse as `T` surfaces as `ModelError::InvalidResponse`.
pub async fn complete_json<T: DeserializeOwned>(
    model: &dyn CompletionModel,
    request: &CompletionRequest,
    schema_name: &str,
    schema: serde_json::Value,
) -> Result<T> {
    let options = CallOptions {
        response_format: Some(ResponseFormat::JsonSchema {
            name: schema_name.into(),
            schema,
        }),
        ..Default::default()
    };
    let text = model.complete(request, &options).await?;
    serde_json::from_str(&text).map_err(|e| {
        ModelError::InvalidResponse(format!("expected {schema_name} JSON: {e}")).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoModel {
        response: String,
    }

    #[async_trait]
    impl CompletionModel for EchoModel {
        async fn complete(
            &self,
            _request: &CompletionRequest,
            _options: &CallOptions,
        ) -> Result<String> {
            Ok(self.response.clone())
        }

        fn model_name(&self) -> &str {
            "echo-model"
        }
    }

    #[derive(Debug, Deserialize)]
    struct Parsed {
        value: i32,
    }

    #[tokio::test]
    async fn complete_returns_text() {
        let model = EchoModel {
            response: "hello".into(),
        };
        let req = CompletionRequest::new("hi");
        let out = model.complete(&req, &CallOptions::default()).await.unwrap();
        assert_eq!(out, "hello");
        assert_eq!(model.model_name(), "echo-model");
    }

    #[tokio::test]
    async fn complete_json_parses_reply() {
        let model = EchoModel {
            response: r#"{"value": 7}"#.into(),
        };
        let req = CompletionRequest::new("give me a value");
        let parsed: Parsed = complete_json(&model, &req, "parsed", serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(parsed.value, 7);
    }

    #[tokio::test]
    async fn complete_json_rejects_malformed_reply() {
        let model = EchoModel {
            response: "not json at all".into(),
        };
        let req = CompletionRequest::new("give me a value");
        let result: Result<Parsed> =
            complete_json(&model, &req, "parsed", serde_json::json!({})).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("parsed"));
    }

    #[test]
    fn completion_request_builder() {
        let req = CompletionRequest::new("find perfumes").with_system("you are an expert");
        assert_eq!(req.prompt, "find perfumes");
        assert_eq!(req.system.as_deref(), Some("you are an expert"));
    }

    #[test]
    fn call_options_default() {
        let opts = CallOptions::default();
        assert!(opts.max_tokens.is_none());
        assert!(opts.temperature.is_none());
        assert!(opts.response_format.is_none());
    }

    #[test]
    fn response_format_serde() {
        let fmt = ResponseFormat::JsonSchema {
            name: "plan".into(),
            schema: serde_json::json!({"type": "object"}),
        };
        let json = serde_json::to_string(&fmt).unwrap();
        assert!(json.contains(r#""type":"json_schema""#));
        let parsed: ResponseFormat = serde_json::from_str(&json).unwrap();
        assert!(matches!(parsed, ResponseFormat::JsonSchema { name, .. } if name == "plan"));
    }
}
