//! Gemini `generateContent` backend

use crate::{error::{CuehandError, Result},
            oracle::{IntentOracle, OracleRequest}};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

/// Default Generative Language API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "GOOGLE_GENERATIVE_AI_API_KEY";

/// Environment variable overriding the model
pub const MODEL_ENV: &str = "CUEHAND_MODEL";

/// Options for the Gemini oracle
#[derive(Debug, Clone)]
pub struct GeminiOptions {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl GeminiOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Read `GOOGLE_GENERATIVE_AI_API_KEY` and, optionally, `CUEHAND_MODEL`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| CuehandError::Config(format!("{} is not set", API_KEY_ENV)))?;

        let mut options = Self::new(api_key);
        if let Some(model) = std::env::var(MODEL_ENV).ok().filter(|m| !m.trim().is_empty()) {
            options.model = model;
        }
        Ok(options)
    }

    /// Builder method: set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder method: set the API endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Builder method: set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Oracle backed by Gemini structured output
pub struct GeminiOracle {
    client: Client,
    options: GeminiOptions,
}

impl GeminiOracle {
    pub fn new(options: GeminiOptions) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(options.timeout)
            .build()
            .map_err(|e| CuehandError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, options })
    }

    /// Build an oracle from the environment
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiOptions::from_env()?)
    }

    pub fn model(&self) -> &str {
        &self.options.model
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.options.endpoint.trim_end_matches('/'),
            self.options.model
        )
    }
}

/// Request body for `generateContent` with JSON output constrained by `schema`
fn request_body(request: &OracleRequest<'_>) -> Value {
    let mut schema = request.schema.clone();
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
    }

    json!({
        "systemInstruction": { "parts": [{ "text": request.system }] },
        "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseJsonSchema": schema,
        },
    })
}

/// Pull the JSON document out of the first candidate
fn parse_response(body: &str) -> Result<Value> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| CuehandError::Oracle(format!("Failed to parse response: {}", e)))?;

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| CuehandError::Oracle("response has no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(CuehandError::Oracle(format!("empty response (finish reason: {})", reason)));
    }

    serde_json::from_str(&text).map_err(|e| CuehandError::Oracle(format!("response is not valid JSON: {}", e)))
}

impl IntentOracle for GeminiOracle {
    fn generate(&self, request: &OracleRequest<'_>) -> Result<Value> {
        log::debug!("Gemini generateContent: model={}", self.options.model);

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.options.api_key)
            .json(&request_body(request))
            .send()
            .map_err(|e| CuehandError::Oracle(e.to_string()))?;

        let status = response.status();
        let body = response.text().map_err(|e| CuehandError::Oracle(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(CuehandError::Oracle(format!("HTTP {}: {}", status.as_u16(), message)));
        }

        parse_response(&body)
    }
}
