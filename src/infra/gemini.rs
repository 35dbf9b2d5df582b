use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::provider::ProviderKind;
use crate::error::{AppError, AppResult};
use crate::services::LanguageModelService;

const ENDPOINT_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    temperature: f64,
}

impl GeminiClient {
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
impl LanguageModelService for GeminiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn generate_commit_message(&self, prompt: &str) -> AppResult<String> {
        let url = format!("{ENDPOINT_BASE}/{}:generateContent", self.model);
        debug!(model = %self.model, "requesting commit message from Gemini");

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&GenerateContentRequest::new(prompt, self.temperature))
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
        provider: ProviderKind::Gemini,
        message,
    }
}

fn extraction_error(reason: String) -> AppError {
    AppError::Extraction {
        provider: ProviderKind::Gemini,
        reason,
    }
}

/// Classify the response body structurally. An `error` object (or an error
/// status) is a provider failure; a body without usable candidate text is an
/// extraction failure and never triggers the fallback chain.
fn parse_response(status: StatusCode, body: &str) -> AppResult<String> {
    let parsed: GenerateContentResponse = match serde_json::from_str(body) {
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
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| extraction_error("no candidate text in response".to_string()))
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn new(prompt: &str, temperature: f64) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig { temperature },
        }
    }
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: Option<String>,
}
