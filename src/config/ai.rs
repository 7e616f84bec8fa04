//! Recommendation provider credentials from environment variables.
//!
//! The provider is chosen once at startup from which key is present:
//! `OPENAI_API_KEY` wins over `GEMINI_API_KEY`; with neither, recommendations
//! are disabled and every advisory call returns a flagged default.

/// Which provider the service talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCredentials {
    /// `OpenAI` chat completions
    OpenAi {
        /// Bearer token
        api_key: String,
    },
    /// Google Gemini `generateContent`
    Gemini {
        /// Query-string key
        api_key: String,
    },
    /// No key configured
    Disabled,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Picks credentials from explicit values, `OpenAI` first.
#[must_use]
pub fn select_credentials(
    openai_key: Option<String>,
    gemini_key: Option<String>,
) -> ProviderCredentials {
    if let Some(api_key) = non_empty(openai_key) {
        ProviderCredentials::OpenAi { api_key }
    } else if let Some(api_key) = non_empty(gemini_key) {
        ProviderCredentials::Gemini { api_key }
    } else {
        ProviderCredentials::Disabled
    }
}

/// Reads `OPENAI_API_KEY` and `GEMINI_API_KEY` from the environment.
#[must_use]
pub fn credentials_from_env() -> ProviderCredentials {
    select_credentials(
        std::env::var("OPENAI_API_KEY").ok(),
        std::env::var("GEMINI_API_KEY").ok(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_preferred_over_gemini() {
        let creds = select_credentials(Some("sk-1".to_string()), Some("g-1".to_string()));
        assert_eq!(
            creds,
            ProviderCredentials::OpenAi {
                api_key: "sk-1".to_string()
            }
        );
    }

    #[test]
    fn test_gemini_fallback() {
        let creds = select_credentials(None, Some("g-1".to_string()));
        assert_eq!(
            creds,
            ProviderCredentials::Gemini {
                api_key: "g-1".to_string()
            }
        );
    }

    #[test]
    fn test_blank_keys_disable_provider() {
        let creds = select_credentials(Some("  ".to_string()), Some(String::new()));
        assert_eq!(creds, ProviderCredentials::Disabled);
        assert_eq!(select_credentials(None, None), ProviderCredentials::Disabled);
    }
}
