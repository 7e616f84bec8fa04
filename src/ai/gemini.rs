//! Google Gemini `generateContent` client.

use crate::errors::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::provider::{Prompt, RecommendationProvider};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Text-only Gemini client; images are not sent
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiProvider {
    /// Creates a client for `model`.
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    // Gemini takes a single text part; the system prompt is prepended.
    fn request_body(prompt: &Prompt) -> Value {
        let text = match &prompt.system {
            Some(system) => format!("{system}\n\n{}", prompt.user),
            None => prompt.user.clone(),
        };
        json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "generationConfig": { "temperature": 0.7, "candidateCount": 1 },
        })
    }
}

#[async_trait]
impl RecommendationProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn supports_images(&self) -> bool {
        false
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        debug!(model = %self.model, "Calling generateContent");
        let url = format!(
            "{API_BASE}/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let response: GenerateResponse = self
            .client
            .post(url)
            .json(&Self::request_body(prompt))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| Error::Ai {
                message: "generateContent returned no text".to_string(),
            })
    }
}
