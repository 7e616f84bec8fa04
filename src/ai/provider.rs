use crate::{
    config::{ai::ProviderCredentials, settings::AiSettings},
    errors::Result,
};
use async_trait::async_trait;
use std::sync::Arc;

use super::{gemini::GeminiProvider, openai::OpenAiProvider};

/// A single request to a text model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    /// Role instructions, sent separately where the provider supports it
    pub system: Option<String>,
    /// The question itself
    pub user: String,
    /// Base64 JPEG attached to the question
    pub image_base64: Option<String>,
}

/// Something that can answer a [`Prompt`] with text
#[async_trait]
pub trait RecommendationProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Whether [`Prompt::image_base64`] is looked at
    fn supports_images(&self) -> bool;

    /// Sends the prompt and returns the raw reply text.
    async fn complete(&self, prompt: &Prompt) -> Result<String>;
}

/// Builds the provider for the configured credentials, `None` when disabled.
#[must_use]
pub fn select_provider(
    credentials: ProviderCredentials,
    settings: &AiSettings,
) -> Option<Arc<dyn RecommendationProvider>> {
    match credentials {
        ProviderCredentials::OpenAi { api_key } => Some(Arc::new(OpenAiProvider::new(
            api_key,
            settings.openai_model.clone(),
        ))),
        ProviderCredentials::Gemini { api_key } => Some(Arc::new(GeminiProvider::new(
            api_key,
            settings.gemini_model.clone(),
        ))),
        ProviderCredentials::Disabled => None,
    }
}
