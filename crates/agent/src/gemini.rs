//! Gemini `generateContent` client.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use haggle_core::config::LlmConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm::{CompletionRequest, LlmClient};
use crate::retry::{is_retryable_status, RetryPolicy};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Sampling settings sent with every request.
///
/// Temperature zero keeps replies close to deterministic even though the
/// system instruction asks for varied phrasing.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_p: 0.95,
            top_k: 64,
            max_output_tokens: 8192,
            response_mime_type: "text/plain".to_string(),
        }
    }
}

pub struct GeminiClient {
    client: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    generation: GenerationConfig,
    retry: RetryPolicy,
}

impl GeminiClient {
    pub fn new(api_key: SecretString, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build gemini http client")?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            generation: GenerationConfig::default(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let retry = RetryPolicy {
            max_retries: config.max_retries,
            base_delay_ms: config.retry_backoff_ms,
            ..RetryPolicy::default()
        };

        Ok(Self::new(
            config.api_key.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )?
        .with_base_url(config.base_url.clone())
        .with_retry_policy(retry))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn build_body(&self, request: &CompletionRequest) -> GeminiRequest {
        let contents: Vec<GeminiContent> = request
            .context
            .iter()
            .chain(std::iter::once(&request.prompt))
            .map(|text| GeminiContent::user(text))
            .collect();

        GeminiRequest {
            system_instruction: GeminiInstruction {
                parts: vec![GeminiPart { text: request.system_instruction.clone() }],
            },
            contents,
            generation_config: self.generation.clone(),
        }
    }

    async fn send_once(&self, body: &GeminiRequest) -> Result<String, CallFailure> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|error| {
                let retryable = error.is_timeout() || error.is_connect() || error.is_request();
                CallFailure { retryable, error: anyhow!(error).context("failed to call gemini api") }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CallFailure {
                retryable: is_retryable_status(status.as_u16()),
                error: anyhow!("gemini api error (HTTP {}): {}", status.as_u16(), detail.trim()),
            });
        }

        let parsed: GeminiResponse = response.json().await.map_err(|error| CallFailure {
            retryable: false,
            error: anyhow!(error).context("failed to decode gemini response"),
        })?;

        parsed.into_text().map_err(|error| CallFailure { retryable: false, error })
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = self.build_body(request);
        let mut attempt = 0;

        loop {
            debug!(
                event_name = "llm.gemini.request",
                model = %self.model,
                attempt = attempt + 1,
                context_turns = request.context.len(),
                "calling gemini generateContent"
            );

            match self.send_once(&body).await {
                Ok(text) => return Ok(text),
                Err(failure) if failure.retryable && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(
                        event_name = "llm.gemini.retry",
                        model = %self.model,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %failure.error,
                        "transient gemini failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(failure) => return Err(failure.error),
            }
        }
    }
}

struct CallFailure {
    retryable: bool,
    error: anyhow::Error,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiInstruction,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn user(text: &str) -> Self {
        Self { role: "user", parts: vec![GeminiPart { text: text.to_string() }] }
    }
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

impl GeminiResponse {
    fn into_text(self) -> Result<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|feedback| feedback.block_reason) {
            return Err(anyhow!("gemini blocked the prompt: {reason}"));
        }

        let candidate =
            self.candidates.into_iter().next().ok_or_else(|| anyhow!("gemini returned no candidates"))?;

        let text: String = candidate
            .content
            .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
            return Err(anyhow!("gemini returned an empty response (finish reason: {reason})"));
        }

        Ok(text)
    }
}
