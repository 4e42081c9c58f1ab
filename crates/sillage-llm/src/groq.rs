//! Groq Chat Completions API integration (OpenAI-compatible).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use sillage_core::error::{ModelError, Result, SillageError};
use sillage_core::model::{CallOptions, CompletionModel, CompletionRequest, ResponseFormat};

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

// ---------------------------------------------------------------------------
// Groq Chat Completions API request/response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GroqRequest {
    pub model: String,
    pub messages: Vec<GroqMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<GroqResponseFormat>,
}

#[derive(Debug, Serialize)]
pub struct GroqMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct GroqResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<GroqJsonSchema>,
}

#[derive(Debug, Serialize)]
pub struct GroqJsonSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct GroqResponse {
    pub choices: Vec<GroqChoice>,
}

#[derive(Debug, Deserialize)]
pub struct GroqChoice {
    pub message: GroqResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct GroqResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GroqError {
    pub error: GroqErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct GroqErrorDetail {
    pub message: String,
}

// ---------------------------------------------------------------------------
// GroqChatModel
// ---------------------------------------------------------------------------

pub struct GroqChatModel {
    api_key: String,
    model_id: String,
    client: reqwest::Client,
}

impl GroqChatModel {
    pub fn new(api_key: String, model_id: String) -> Self {
        Self {
            api_key,
            model_id,
            client: reqwest::Client::new(),
        }
    }

    pub fn build_request(&self, request: &CompletionRequest, options: &CallOptions) -> GroqRequest {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(GroqMessage {
                role: "system".into(),
                content: system.clone(),
            });
        }
        messages.push(GroqMessage {
            role: "user".into(),
            content: request.prompt.clone(),
        });

        let response_format = match &options.response_format {
            Some(ResponseFormat::JsonSchema { name, schema }) => Some(GroqResponseFormat {
                format_type: "json_schema".into(),
                json_schema: Some(GroqJsonSchema {
                    name: name.clone(),
                    schema: schema.clone(),
                }),
            }),
            Some(ResponseFormat::Text) | None => None,
        };

        GroqRequest {
            model: self.model_id.clone(),
            messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            response_format,
        }
    }
}

#[async_trait]
impl CompletionModel for GroqChatModel {
    async fn complete(
        &self,
        request: &CompletionRequest,
        options: &CallOptions,
    ) -> Result<String> {
        let request_body = self.build_request(request, options);

        let response = self
            .client
            .post(GROQ_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| SillageError::Model(ModelError::ApiRequest(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read response body".into());
            let error_msg = serde_json::from_str::<GroqError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(SillageError::Model(match status.as_u16() {
                401 => ModelError::Auth(error_msg),
                429 => ModelError::RateLimited {
                    retry_after_secs: None,
                },
                _ => ModelError::ApiRequest(format!("HTTP {status}: {error_msg}")),
            }));
        }

        let api_response: GroqResponse = response
            .json()
            .await
            .map_err(|e| SillageError::Model(ModelError::InvalidResponse(e.to_string())))?;

        let text = api_response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| {
                SillageError::Model(ModelError::InvalidResponse(
                    "response contained no choices".into(),
                ))
            })?;

        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model_id
    }
}
