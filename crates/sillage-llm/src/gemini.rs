//! Gemini generateContent API integration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use sillage_core::error::{ModelError, Result, SillageError};
use sillage_core::model::{CallOptions, CompletionModel, CompletionRequest, ResponseFormat};

// ---------------------------------------------------------------------------
// Gemini API request types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Gemini API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    pub candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    pub content: GeminiContent,
}

// ---------------------------------------------------------------------------
// GeminiChatModel
// ---------------------------------------------------------------------------

pub struct GeminiChatModel {
    api_key: String,
    model_id: String,
    client: reqwest::Client,
}

impl GeminiChatModel {
    pub fn new(api_key: String, model_id: String) -> Self {
        Self {
            api_key,
            model_id,
            client: reqwest::Client::new(),
        }
    }

    pub fn build_request(
        &self,
        request: &CompletionRequest,
        options: &CallOptions,
    ) -> GeminiRequest {
        let system_instruction = request.system.as_ref().map(|system| GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: Some(system.clone()),
            }],
        });

        let contents = vec![GeminiContent {
            role: Some("user".into()),
            parts: vec![GeminiPart {
                text: Some(request.prompt.clone()),
            }],
        }];

        let (response_mime_type, response_schema) = match &options.response_format {
            Some(ResponseFormat::JsonSchema { schema, .. }) => {
                (Some("application/json".into()), Some(schema.clone()))
            }
            Some(ResponseFormat::Text) | None => (None, None),
        };

        let generation_config = if options.max_tokens.is_some()
            || options.temperature.is_some()
            || response_mime_type.is_some()
        {
            Some(GenerationConfig {
                max_output_tokens: options.max_tokens,
                temperature: options.temperature,
                response_mime_type,
                response_schema,
            })
        } else {
            None
        };

        GeminiRequest {
            system_instruction,
            contents,
            generation_config,
        }
    }
}

#[async_trait]
impl CompletionModel for GeminiChatModel {
    async fn complete(
        &self,
        request: &CompletionRequest,
        options: &CallOptions,
    ) -> Result<String> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model_id, self.api_key
        );

        let request_body = self.build_request(request, options);

        let response = self
            .client
            .post(&url)
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
            return Err(SillageError::Model(
                if status.as_u16() == 401 || status.as_u16() == 403 {
                    ModelError::Auth(body)
                } else if status.as_u16() == 429 {
                    ModelError::RateLimited {
                        retry_after_secs: None,
                    }
                } else {
                    ModelError::ApiRequest(format!("HTTP {status}: {body}"))
                },
            ));
        }

        let api_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| SillageError::Model(ModelError::InvalidResponse(e.to_string())))?;

        let text = api_response
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.content.parts.first())
            .and_then(|p| p.text.clone())
            .ok_or_else(|| {
                SillageError::Model(ModelError::InvalidResponse(
                    "response contained no candidates".into(),
                ))
            })?;

        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> GeminiChatModel {
        GeminiChatModel::new("test-key".into(), "gemini-2.0-flash".into())
    }

    #[test]
    fn build_request_basic() {
        let req = CompletionRequest::new("find rose perfumes");
        let body = model().build_request(&req, &CallOptions::default());

        assert!(body.system_instruction.is_none());
        assert_eq!(body.contents.len(), 1);
        assert_eq!(body.contents[0].role.as_deref(), Some("user"));
        assert_eq!(
            body.contents[0].parts[0].text.as_deref(),
            Some("find rose perfumes")
        );
        assert!(body.generation_config.is_none());
    }

    #[test]
    fn build_request_with_system() {
        let req = CompletionRequest::new("find rose perfumes").with_system("you are an expert");
        let body = model().build_request(&req, &CallOptions::default());

        let system = body.system_instruction.expect("system should be set");
        assert_eq!(system.parts[0].text.as_deref(), Some("you are an expert"));
    }

    #[test]
    fn build_request_with_json_schema() {
        let req = CompletionRequest::new("plan searches");
        let options = CallOptions {
            response_format: Some(ResponseFormat::JsonSchema {
                name: "plan".into(),
                schema: serde_json::json!({"type": "object"}),
            }),
            ..Default::default()
        };
        let body = model().build_request(&req, &options);

        let config = body.generation_config.expect("config should be set");
        assert_eq!(config.response_mime_type.as_deref(), Some("application/json"));
        assert!(config.response_schema.is_some());
    }

    #[test]
    fn generation_config_serializes_camel_case() {
        let config = GenerationConfig {
            max_output_tokens: Some(100),
            temperature: None,
            response_mime_type: Some("application/json".into()),
            response_schema: None,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("maxOutputTokens"));
        assert!(json.contains("responseMimeType"));
    }

    #[test]
    fn parse_response_text() {
        let json = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Portrait of a Lady"}]}}
            ]
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        let text = resp.candidates.unwrap()[0].content.parts[0]
            .text
            .clone()
            .unwrap();
        assert_eq!(text, "Portrait of a Lady");
    }

    #[test]
    fn model_name_returns_id() {
        assert_eq!(model().model_name(), "gemini-2.0-flash");
    }
}
