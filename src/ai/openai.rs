//! `OpenAI` chat completions client.

use crate::errors::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::provider::{Prompt, RecommendationProvider};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Talks to the chat completions endpoint in JSON-object mode
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

impl OpenAiProvider {
    /// Creates a client for `model`.
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    fn request_body(&self, prompt: &Prompt) -> Value {
        let mut messages = Vec::new();
        if let Some(system) = &prompt.system {
            messages.push(json!({ "role": "system", "content": system }));
        }

        let user_content = match &prompt.image_base64 {
            Some(image) => json!([
                { "type": "text", "text": prompt.user },
                {
                    "type": "image_url",
                    "image_url": { "url": format!("data:image/jpeg;base64,{image}") }
                }
            ]),
            None => json!(prompt.user),
        };
        messages.push(json!({ "role": "user", "content": user_content }));

        json!({
            "model": self.model,
            "messages": messages,
            "response_format": { "type": "json_object" },
        })
    }
}

#[async_trait]
impl RecommendationProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn supports_images(&self) -> bool {
        true
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        debug!(model = %self.model, "Calling chat completions");
        let response: ChatResponse = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Ai {
                message: "completion had no content".to_string(),
            })
    }
}
