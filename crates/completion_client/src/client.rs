use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;

use crate::client_trait::CompletionClientTrait;
use crate::config::ClientConfig;
use crate::error::{CompletionError, Result};
use crate::models::{ChatCompletionRequest, ChatCompletionResponse};

/// Chat-completion client for Azure OpenAI deployments.
#[derive(Debug, Clone)]
pub struct AzureOpenAIClient {
    client: Client,
    config: ClientConfig,
}

impl AzureOpenAIClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Self::build_http_client(&config)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn build_http_client(config: &ClientConfig) -> Result<Client> {
        let mut builder = Client::builder().default_headers(Self::get_default_headers());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }

    fn get_default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }
}

#[async_trait]
impl CompletionClientTrait for AzureOpenAIClient {
    async fn get_chat_completions(
        &self,
        deployment: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        let url = self.config.chat_completions_url(deployment);
        info!(
            "Sending chat completion to deployment '{}' with {} messages",
            deployment,
            request.messages.len()
        );

        let start_time = std::time::Instant::now();
        let response = self
            .client
            .post(&url)
            .query(&[("api-version", self.config.api_version.as_str())])
            .header("api-key", &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send chat completion request to {}: {}", url, e);
                CompletionError::Http(e)
            })?;

        let status = response.status();
        info!(
            "Got response from {} after {:?} with status {}",
            url,
            start_time.elapsed(),
            status
        );

        let text = response.text().await?;
        if !status.is_success() {
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        debug!("Chat completion body: {} bytes", text.len());
        Ok(serde_json::from_str(&text)?)
    }
}
