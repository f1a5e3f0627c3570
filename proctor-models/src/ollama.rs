//! Ollama chat backend.
//!
//! # Example
//!
//! ```ignore
//! use proctor_models::OllamaClient;
//!
//! let client = OllamaClient::new("llama3.1");  // Uses localhost:11434
//! let client = OllamaClient::with_base_url("http://192.168.1.100:11434", "llama3.1");
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ChatModel, Error, Prompt, Result};

/// Default Ollama API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default model name.
pub const DEFAULT_MODEL: &str = "llama3.1";

/// Sampling seed sent with every request.
pub const DEFAULT_SEED: u64 = 42;

// ────────────────────────────────────────────────────────────────────────────
// Ollama API Types
// ────────────────────────────────────────────────────────────────────────────

/// Message in an Ollama chat request/response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OllamaChatMessage {
    pub role: String,
    pub content: String,
}

/// Request body for Ollama's `/api/chat` endpoint.
#[derive(Debug, Serialize)]
pub struct OllamaChatRequest {
    pub model: String,
    pub messages: Vec<OllamaChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub options: OllamaChatOptions,
}

/// Sampling options. Temperature 0 and a fixed seed keep replies stable.
#[derive(Debug, Serialize)]
pub struct OllamaChatOptions {
    pub temperature: f32,
    pub seed: u64,
}

/// Response from Ollama's `/api/chat` endpoint.
#[derive(Debug, Deserialize)]
pub struct OllamaChatResponse {
    pub model: String,
    pub message: OllamaChatMessage,
    pub done: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// OllamaClient
// ────────────────────────────────────────────────────────────────────────────

/// Non-streaming client for a local or remote Ollama instance.
pub struct OllamaClient {
    base_url: String,
    model: String,
    seed: u64,
    client: reqwest::Client,
}

impl OllamaClient {
    /// Client for `model` at the default URL (localhost:11434).
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, model)
    }

    pub fn with_base_url(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            seed: DEFAULT_SEED,
            client: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the request body for a prompt.
    pub fn request_for(&self, prompt: &Prompt) -> OllamaChatRequest {
        OllamaChatRequest {
            model: self.model.clone(),
            messages: vec![
                OllamaChatMessage {
                    role: "system".to_string(),
                    content: prompt.system.clone(),
                },
                OllamaChatMessage {
                    role: "user".to_string(),
                    content: prompt.user.clone(),
                },
            ],
            stream: false,
            format: prompt.json.then(|| "json".to_string()),
            options: OllamaChatOptions {
                temperature: 0.0,
                seed: self.seed,
            },
        }
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        debug!(model = %self.model, json = prompt.json, "Sending chat request");

        let response = self
            .client
            .post(&url)
            .json(&self.request_for(prompt))
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ProviderApi(format!(
                "Ollama API returned {}: {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        reply_content(&body)
    }
}

/// Message content of a `/api/chat` response body.
fn reply_content(body: &str) -> Result<String> {
    let reply: OllamaChatResponse = serde_json::from_str(body)
        .map_err(|e| Error::InvalidReply(format!("undecodable chat response: {e}")))?;
    Ok(reply.message.content)
}
