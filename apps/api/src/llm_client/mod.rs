//! LLM client: the single point of entry for all generative completion calls.
//!
//! Handlers never talk to the provider directly: they build a [`Prompt`] and ask
//! [`StructuredClient::complete`] for a typed, schema-checked value.
//!
//! Model: gemini-flash-lite-latest (hardcoded so every capability uses the same model)

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::schema::{self, Schema, SchemaError};

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all completion calls.
pub const MODEL: &str = "gemini-flash-lite-latest";
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// A `(system, user)` instruction pair produced by the prompt builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Error)]
pub enum CompletionError {
    /// Network failure, timeout, missing key or non-2xx status. Not retried here.
    #[error("completion provider error: {0}")]
    Transport(String),

    /// Well-formed JSON that fails schema validation. Regenerating may succeed.
    #[error("model output failed validation: {0}")]
    SchemaViolation(#[from] SchemaError),

    /// Non-JSON, empty or truncated output.
    #[error("model returned malformed output: {0}")]
    MalformedOutput(String),
}

impl CompletionError {
    /// Only schema violations are worth a blind retry; the other classes need
    /// a fix upstream or a different prompt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CompletionError::SchemaViolation(_))
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(e: reqwest::Error) -> Self {
        CompletionError::Transport(e.to_string())
    }
}

/// Raw text generation. Implementations return the model's text exactly as
/// produced; parsing belongs to [`StructuredClient`].
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn generate_json(&self, prompt: &Prompt) -> Result<String, CompletionError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, or an error if the candidate
    /// is missing, empty, or was cut off by the token limit.
    pub fn into_text(self) -> Result<String, CompletionError> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::MalformedOutput("no candidates returned".to_string()))?;

        if candidate.finish_reason.as_deref() == Some("MAX_TOKENS") {
            return Err(CompletionError::MalformedOutput(
                "output truncated at token limit".to_string(),
            ));
        }

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(CompletionError::MalformedOutput(
                "model returned empty content".to_string(),
            ));
        }
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Gemini `generateContent` backend with JSON response mode.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    /// A missing key is not fatal: the first call fails with a transport error.
    pub fn new(api_key: Option<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
            base_url: GEMINI_API_BASE.to_string(),
        })
    }
}

#[async_trait]
impl CompletionBackend for GeminiClient {
    async fn generate_json(&self, prompt: &Prompt) -> Result<String, CompletionError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            CompletionError::Transport("GEMINI_API_KEY is not configured".to_string())
        })?;

        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &prompt.system,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: &prompt.user }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let url = format!("{}/{MODEL}:generateContent", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("Completion API returned {}: {}", status, message);
            return Err(CompletionError::Transport(format!(
                "status {}: {message}",
                status.as_u16()
            )));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "Completion call succeeded: prompt_tokens={}, output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }
        parsed.into_text()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Structured completion
// ────────────────────────────────────────────────────────────────────────────

/// Asks the backend for JSON and validates it against the requested schema.
#[derive(Clone)]
pub struct StructuredClient {
    backend: Arc<dyn CompletionBackend>,
}

impl StructuredClient {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    pub async fn complete<T: Schema>(&self, prompt: &Prompt) -> Result<T, CompletionError> {
        let raw = self.backend.generate_json(prompt).await?;
        let parsed = parse_structured(&raw);
        if let Err(e) = &parsed {
            warn!(retryable = e.is_retryable(), "Discarding {} output: {e}", T::ID);
        }
        parsed
    }
}

/// Parses raw model text into `T`: strip fences, decode JSON, validate.
pub fn parse_structured<T: Schema>(raw: &str) -> Result<T, CompletionError> {
    let text = strip_json_fences(raw);
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| {
        CompletionError::MalformedOutput(format!("{} output is not valid JSON: {e}", T::ID))
    })?;
    schema::validate(value).map_err(CompletionError::SchemaViolation)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped
                .strip_suffix("```")
                .map(|s| s.trim())
                .unwrap_or(stripped)
        }
        None => text,
    }
}
