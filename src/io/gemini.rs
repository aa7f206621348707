//! Gemini text generation (Google Generative Language API)
//!
//! One non-streaming `generateContent` call per prompt. The reply text is the
//! concatenation of the first candidate's text parts.

use crate::infra::config::Config;
use crate::services::summary::TextGenerator;
use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// None when the key variable is unset; every request then fails fast
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Build from application config, reading the key from the configured env var
    pub fn from_config(config: &Config) -> Self {
        let api_key = std::env::var(config.summary_api_key_env())
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        Self {
            api_key,
            base_url: config.summary_base_url().trim_end_matches('/').to_string(),
            model: config.summary_model().to_string(),
            timeout: Duration::from_millis(config.summary_timeout_ms()),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        (!text.is_empty()).then_some(text)
    }
}

pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> anyhow::Result<Self> {
        // Create HTTP client once for reuse (connection pooling)
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build Gemini HTTP client")?;
        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.config.base_url, self.config.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            bail!("Gemini API key is not configured");
        };

        let request = GenerateRequest {
            contents: [Content { role: "user", parts: [Part { text: prompt }] }],
        };

        debug!(model = %self.config.model, prompt_chars = prompt.chars().count(), "gemini_request");
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Gemini returned HTTP {}: {}", status.as_u16(), body.trim());
        }

        let parsed: GenerateResponse =
            response.json().await.context("Gemini response was not valid JSON")?;
        parsed.into_text().ok_or_else(|| anyhow!("Gemini response contained no text"))
    }
}
