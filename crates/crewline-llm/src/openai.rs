//! OpenAI-compatible chat-completions provider
use async_trait::async_trait;
use crewline_core::{GenerationError, GenerationRequest, ResponseShape, TextGenerator};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::{ConfigError, LlmConfig};

// =============================================================================
// API Request/Response Types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

// =============================================================================
// Provider
// =============================================================================

pub struct OpenAiGenerator {
    client: Client,
    config: LlmConfig,
}

impl OpenAiGenerator {
    pub fn new(config: LlmConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn build_request<'a>(&'a self, request: &GenerationRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: user_content(request),
        });

        ChatRequest {
            model: &self.config.model,
            messages,
            response_format: match request.shape {
                ResponseShape::Json => Some(ResponseFormat {
                    format_type: "json_object",
                }),
                ResponseShape::Text => None,
            },
            temperature: self.config.temperature,
        }
    }

    fn map_transport(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout(self.config.timeout.as_secs())
        } else {
            GenerationError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = self.build_request(request);
        debug!(model = %self.config.model, shape = ?request.shape, "sending chat completion");

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_transport(e))?;
        if !status.is_success() {
            return Err(status_error(status, &text));
        }
        parse_completion(&text)
    }
}

/// The prompt, followed by the expected-output hint when there is one.
fn user_content(request: &GenerationRequest) -> String {
    match request.shape_hint.as_deref().map(str::trim) {
        Some(hint) if !hint.is_empty() => {
            format!("{}\n\nThis is the expected criteria for your final answer: {}", request.prompt, hint)
        }
        _ => request.prompt.clone(),
    }
}

fn status_error(status: StatusCode, body: &str) -> GenerationError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited(message),
        _ => GenerationError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

fn parse_completion(body: &str) -> Result<String, GenerationError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| GenerationError::InvalidResponse("no choices in completion".to_string()))?;

    if content.trim().is_empty() {
        return Err(GenerationError::Empty);
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> OpenAiGenerator {
        OpenAiGenerator::new(LlmConfig::new("sk-test").with_temperature(0.2)).unwrap()
    }

    #[test]
    fn test_text_request_body() {
        let generator = generator();
        let request = GenerationRequest::new("Summarize AGP.")
            .with_system("You are a strategist.")
            .with_shape_hint("3 paragraphs");

        let body = serde_json::to_value(generator.build_request(&request)).unwrap();

        assert_eq!(body["model"], "gpt-4-turbo");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body["messages"][1]["content"]
            .as_str()
            .unwrap()
            .ends_with("final answer: 3 paragraphs"));
        assert!(body.get("response_format").is_none());
        assert!((body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_json_request_body() {
        let generator = generator();
        let request = GenerationRequest::new("Storm in Kansas").json();

        let body = serde_json::to_value(generator.build_request(&request)).unwrap();

        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["content"], "Storm in Kansas");
    }

    #[test]
    fn test_parse_completion() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "EGFR"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "EGFR");

        assert_eq!(
            parse_completion(r#"{"choices": [{"message": {"content": " "}}]}"#),
            Err(GenerationError::Empty)
        );
        assert!(matches!(
            parse_completion(r#"{"choices": []}"#),
            Err(GenerationError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_completion("<html>"),
            Err(GenerationError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_status_errors() {
        let quota = r#"{"error": {"message": "You exceeded your current quota"}}"#;
        assert_eq!(
            status_error(StatusCode::TOO_MANY_REQUESTS, quota),
            GenerationError::RateLimited("You exceeded your current quota".to_string())
        );
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "{}"),
            GenerationError::Auth(_)
        ));
        assert_eq!(
            status_error(StatusCode::BAD_GATEWAY, "upstream down\n"),
            GenerationError::Api {
                status: 502,
                message: "upstream down".to_string()
            }
        );
    }
}
