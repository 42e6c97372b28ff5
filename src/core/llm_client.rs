// src/core/llm_client.rs
//! Hosted language-model access behind the `TextGenerator` trait

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::core::config_manager::{LlmConfig, LlmProvider};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const OPENAI_API_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("language model is not configured")]
    NotConfigured,
    #[error("language model request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("language model returned status {code}: {body}")]
    Status { code: u16, body: String },
    #[error("language model returned no text")]
    EmptyResponse,
    #[error("language model output is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
    #[error("language model output is missing or has invalid `{0}`")]
    MissingField(&'static str),
}

/// Sampling settings for one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationOptions {
    pub const QUESTION: Self = Self {
        temperature: 0.7,
        max_tokens: 400,
    };
    pub const ANALYSIS: Self = Self {
        temperature: 0.3,
        max_tokens: 600,
    };
    pub const SUMMARY: Self = Self {
        temperature: 0.3,
        max_tokens: 600,
    };
}

#[rocket::async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// False when every call is known to fail without a request.
    fn is_enabled(&self) -> bool {
        true
    }

    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, LlmError>;
}

/// Used when no API key is configured.
pub struct DisabledGenerator;

#[rocket::async_trait]
impl TextGenerator for DisabledGenerator {
    fn name(&self) -> &str {
        "disabled"
    }

    fn is_enabled(&self) -> bool {
        false
    }

    async fn generate(
        &self,
        _system: &str,
        _prompt: &str,
        _options: GenerationOptions,
    ) -> Result<String, LlmError> {
        Err(LlmError::NotConfigured)
    }
}

pub struct HttpTextGenerator {
    client: reqwest::Client,
    provider: LlmProvider,
    api_key: String,
    model: String,
    base_url: String,
}

impl HttpTextGenerator {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| match config.provider {
                LlmProvider::Gemini => GEMINI_API_URL.to_string(),
                LlmProvider::OpenAi => OPENAI_API_URL.to_string(),
            });

        Ok(Self {
            client,
            provider: config.provider,
            api_key,
            model: config.model.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(
        &self,
        system: &str,
        prompt: &str,
        options: GenerationOptions,
    ) -> reqwest::RequestBuilder {
        match self.provider {
            LlmProvider::Gemini => {
                let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
                let body = serde_json::json!({
                    "systemInstruction": { "parts": [{ "text": system }] },
                    "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
                    "generationConfig": {
                        "temperature": options.temperature,
                        "maxOutputTokens": options.max_tokens,
                    }
                });
                self.client
                    .post(url)
                    .query(&[("key", self.api_key.as_str())])
                    .json(&body)
            }
            LlmProvider::OpenAi => {
                let url = format!("{}/chat/completions", self.base_url);
                let body = serde_json::json!({
                    "model": self.model,
                    "messages": [
                        { "role": "system", "content": system },
                        { "role": "user", "content": prompt }
                    ],
                    "temperature": options.temperature,
                    "max_tokens": options.max_tokens,
                });
                self.client
                    .post(url)
                    .bearer_auth(&self.api_key)
                    .json(&body)
            }
        }
    }
}

#[rocket::async_trait]
impl TextGenerator for HttpTextGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, LlmError> {
        debug!("Calling {} ({:?})", self.model, self.provider);

        let response = self.request(system, prompt, options).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Language model error response {}: {}", status, body);
            return Err(LlmError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let content = match self.provider {
            LlmProvider::Gemini => extract_gemini_text(&text)?,
            LlmProvider::OpenAi => extract_openai_text(&text)?,
        };

        if content.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(content)
    }
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

fn extract_gemini_text(body: &str) -> Result<String, LlmError> {
    let parsed: GeminiResponse = serde_json::from_str(body)?;
    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();
    Ok(text)
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

fn extract_openai_text(body: &str) -> Result<String, LlmError> {
    let parsed: ChatResponse = serde_json::from_str(body)?;
    Ok(parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default())
}

/// Generator for the loaded configuration. No key means the engine runs on
/// its built-in bank and heuristics only.
pub fn from_config(config: &LlmConfig) -> Result<Box<dyn TextGenerator>> {
    match config.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        Some(key) => {
            info!(
                "Language model enabled: {:?} / {}",
                config.provider, config.model
            );
            Ok(Box::new(HttpTextGenerator::new(config, key.to_string())?))
        }
        None => {
            info!("No language model API key configured, using built-in question bank and scoring");
            Ok(Box::new(DisabledGenerator))
        }
    }
}
