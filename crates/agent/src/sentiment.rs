//! Sentiment classification backends.
//!
//! Both backends produce a raw three-class label (negative / neutral /
//! positive) and then go through [`SentimentCategory::from_model_label`], so
//! the mapping onto domain buckets lives in one place.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use haggle_core::config::{ClassifierConfig, ClassifierProvider};
use haggle_core::SentimentCategory;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    fn name(&self) -> &'static str;
    async fn classify(&self, text: &str) -> Result<SentimentCategory>;
}

pub fn classifier_from_config(config: &ClassifierConfig) -> Result<Box<dyn SentimentClassifier>> {
    match config.provider {
        ClassifierProvider::Hosted => Ok(Box::new(HostedClassifier::from_config(config)?)),
        ClassifierProvider::Lexicon => Ok(Box::new(LexiconClassifier::new())),
    }
}

/// Client for a hosted text-classification inference endpoint
/// (`POST {base_url}/models/{model}` with `{"inputs": text}`).
pub struct HostedClassifier {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl InferenceResponse {
    fn into_scores(self) -> Vec<LabelScore> {
        match self {
            Self::Nested(batches) => batches.into_iter().next().unwrap_or_default(),
            Self::Flat(scores) => scores,
        }
    }
}

impl HostedClassifier {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build classifier http client")?;

        Ok(Self { client, base_url: base_url.into(), model: model.into(), api_key })
    }

    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            config.model.clone(),
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url.trim_end_matches('/'), self.model)
    }
}

#[async_trait]
impl SentimentClassifier for HostedClassifier {
    fn name(&self) -> &'static str {
        "hosted"
    }

    async fn classify(&self, text: &str) -> Result<SentimentCategory> {
        let mut request = self.client.post(self.endpoint()).json(&InferenceRequest { inputs: text });
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request.send().await.context("failed to call sentiment classifier")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("sentiment classifier error (HTTP {}): {}", status.as_u16(), detail.trim());
        }

        let parsed: InferenceResponse =
            response.json().await.context("failed to decode sentiment classifier response")?;
        let top = top_label(parsed.into_scores())
            .ok_or_else(|| anyhow!("sentiment classifier returned no labels"))?;

        debug!(
            event_name = "classifier.hosted.result",
            model = %self.model,
            label = %top.label,
            score = top.score,
            "sentiment classified"
        );

        Ok(SentimentCategory::from_model_label(&top.label))
    }
}

fn top_label(scores: Vec<LabelScore>) -> Option<LabelScore> {
    scores.into_iter().fold(None, |best: Option<LabelScore>, candidate| match best {
        Some(current) if current.score >= candidate.score => Some(current),
        _ => Some(candidate),
    })
}

const POSITIVE_CUES: &[&str] = &[
    "please",
    "thank",
    "thanks",
    "appreciate",
    "appreciated",
    "kindly",
    "grateful",
    "love",
    "lovely",
    "great",
    "wonderful",
    "respectfully",
    "happy",
    "glad",
];

const NEGATIVE_CUES: &[&str] = &[
    "ridiculous",
    "ripoff",
    "rip-off",
    "scam",
    "overpriced",
    "terrible",
    "awful",
    "hate",
    "greedy",
    "insane",
    "joke",
    "absurd",
    "worst",
    "outrageous",
    "stupid",
    "robbery",
];

/// Keyword-scoring classifier that needs no model or network.
#[derive(Clone, Debug, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Raw label in the same positional space the hosted model uses.
    pub fn raw_label(&self, text: &str) -> &'static str {
        let normalized = text.to_ascii_lowercase();
        let score: i32 = normalized
            .split(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '-'))
            .filter(|token| !token.is_empty())
            .map(|token| {
                if POSITIVE_CUES.contains(&token) {
                    1
                } else if NEGATIVE_CUES.contains(&token) {
                    -1
                } else {
                    0
                }
            })
            .sum();

        match score {
            s if s > 0 => "LABEL_2",
            s if s < 0 => "LABEL_0",
            _ => "LABEL_1",
        }
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    async fn classify(&self, text: &str) -> Result<SentimentCategory> {
        Ok(SentimentCategory::from_model_label(self.raw_label(text)))
    }
}
