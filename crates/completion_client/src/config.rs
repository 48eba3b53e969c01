use std::time::Duration;

use crate::error::{CompletionError, Result};

pub const DEFAULT_API_VERSION: &str = "2024-02-01";

/// Connection settings for an Azure OpenAI resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: None,
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(CompletionError::Config(
                "completion endpoint must not be empty".to_string(),
            ));
        }
        if self.api_key.trim().is_empty() {
            return Err(CompletionError::Config(
                "completion API key must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// `{endpoint}/openai/deployments/{deployment}/chat/completions`, without the query string.
    pub fn chat_completions_url(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint.trim_end_matches('/'),
            deployment
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_known_api_version() {
        let config = ClientConfig::new("https://example.openai.azure.com", "key");
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn url_tolerates_trailing_slash() {
        let with_slash = ClientConfig::new("https://example.openai.azure.com/", "key");
        let without_slash = ClientConfig::new("https://example.openai.azure.com", "key");

        let expected =
            "https://example.openai.azure.com/openai/deployments/gpt35-turbo/chat/completions";
        assert_eq!(with_slash.chat_completions_url("gpt35-turbo"), expected);
        assert_eq!(without_slash.chat_completions_url("gpt35-turbo"), expected);
    }

    #[test]
    fn validate_rejects_blank_values() {
        assert!(ClientConfig::new("", "key").validate().is_err());
        assert!(ClientConfig::new("https://x", "  ").validate().is_err());
        assert!(ClientConfig::new("https://x", "key").validate().is_ok());
    }

    #[test]
    fn builders_chain() {
        let config = ClientConfig::new("https://x", "key")
            .with_api_version("2024-06-01")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.api_version, "2024-06-01");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }
}
