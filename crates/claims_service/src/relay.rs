use std::sync::Arc;

use completion_client::{ChatCompletionResponse, CompletionClientTrait, SamplingConfig};

use crate::conversation::{CompletionExchange, Transcript};
use crate::error::RelayError;

/// Substituted when the completion carries no text.
pub const UNPARSED_PLACEHOLDER: &str = "<unable to parse conversation>";

/// Sends one instruction/transcript exchange to the completion collaborator.
pub struct CompletionRelay {
    client: Arc<dyn CompletionClientTrait>,
    deployment: String,
    sampling: SamplingConfig,
}

impl CompletionRelay {
    pub fn new(client: Arc<dyn CompletionClientTrait>, deployment: impl Into<String>) -> Self {
        Self {
            client,
            deployment: deployment.into(),
            sampling: SamplingConfig::default(),
        }
    }

    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    pub async fn complete(
        &self,
        instruction: impl Into<String>,
        transcript: &Transcript,
    ) -> Result<String, RelayError> {
        let request = CompletionExchange::new(instruction, transcript).into_request(self.sampling);
        tracing::debug!(
            deployment = %self.deployment,
            messages = request.messages.len(),
            "Submitting completion exchange"
        );

        let response = self
            .client
            .get_chat_completions(&self.deployment, &request)
            .await?;

        Ok(extract_result_text(&response))
    }
}

pub fn extract_result_text(response: &ChatCompletionResponse) -> String {
    match response.first_content() {
        Some(content) => content.to_string(),
        None => {
            tracing::warn!("Completion returned no content, using placeholder");
            UNPARSED_PLACEHOLDER.to_string()
        }
    }
}
