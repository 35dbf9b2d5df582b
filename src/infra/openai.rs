use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::provider::ProviderKind;
use crate::error::{AppError, AppResult};
use crate::services::LanguageModelService;

const ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct OpenAiClient {
    http: Client,
    api_key: String,
    model: String,
    temperature: f64,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String, temperature: f64) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| AppError::Configuration(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            api_key,
            model,
            temperature,
        })
    }
}

#[async_trait]
impl LanguageModelService for OpenAiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn generate_commit_message(&self, prompt: &str) -> AppResult<String> {
        debug!(model = %self.model, "requesting commit message from OpenAI");

        let response = self
            .http
            .post(ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&ChatCompletionRequest::new(
                &self.model,
                prompt,
                self.temperature,
            ))
            .send()
            .await
            .map_err(|err| provider_error(format!("network failure: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| provider_error(format!("network failure: {err}")))?;

        parse_response(status, &body)
    }
}

fn provider_error(message: String) -> AppError {
    AppError::Provider {
        provider: ProviderKind::OpenAi,
        message,
    }
}

fn extraction_error(reason: String) -> AppError {
    AppError::Extraction {
        provider: ProviderKind::OpenAi,
        reason,
    }
}

/// Same classification rules as the Gemini client: an `error` object or an
/// error status is a provider failure, a body without usable choice text is
/// an extraction failure.
fn parse_response(status: StatusCode, body: &str) -> AppResult<String> {
    let parsed: ChatCompletionResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) if !status.is_success() => {
            return Err(provider_error(format!("HTTP {status}")));
        }
        Err(err) => {
            return Err(extraction_error(format!("response was not valid JSON: {err}")));
        }
    };

    if let Some(error) = parsed.error {
        return Err(provider_error(
            error.message.unwrap_or_else(|| format!("HTTP {status}")),
        ));
    }
    if !status.is_success() {
        return Err(provider_error(format!("HTTP {status}")));
    }

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| extraction_error("no choice text in response".to_string()))
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

impl ChatCompletionRequest {
    fn new(model: &str, prompt: &str, temperature: f64) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature,
        }
    }
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_matches_the_wire_format() {
        let request = ChatCompletionRequest::new("gpt-4o-mini", "describe this diff", 0.3);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "gpt-4o-mini",
                "messages": [{"role": "user", "content": "describe this diff"}],
                "temperature": 0.3,
            })
        );
    }

    #[test]
    fn extracts_choice_text_unmodified() {
        let body = json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Tighten resolver bounds"},
                "finish_reason": "stop",
            }]
        })
        .to_string();

        let text = parse_response(StatusCode::OK, &body).unwrap();
        assert_eq!(text, "Tighten resolver bounds");
    }

    #[test]
    fn error_object_is_a_provider_failure() {
        let body = json!({
            "error": {
                "message": "Incorrect API key provided",
                "type": "invalid_request_error",
            }
        })
        .to_string();

        match parse_response(StatusCode::UNAUTHORIZED, &body) {
            Err(AppError::Provider { message, .. }) => {
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[test]
    fn choice_text_containing_the_word_error_is_still_a_success() {
        let body = json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Propagate error codes from git"},
            }]
        })
        .to_string();

        let text = parse_response(StatusCode::OK, &body).unwrap();
        assert_eq!(text, "Propagate error codes from git");
    }

    #[test]
    fn missing_choices_are_an_extraction_failure() {
        match parse_response(StatusCode::OK, "{}") {
            Err(AppError::Extraction { .. }) => {}
            other => panic!("expected extraction error, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_success_body_is_an_extraction_failure() {
        match parse_response(StatusCode::OK, "not json") {
            Err(AppError::Extraction { .. }) => {}
            other => panic!("expected extraction error, got {other:?}"),
        }
    }
}
