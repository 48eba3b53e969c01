use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ChatCompletionRequest, ChatCompletionResponse};

#[async_trait]
pub trait CompletionClientTrait: Send + Sync {
    /// Run a single, non-streaming chat completion against `deployment`.
    async fn get_chat_completions(
        &self,
        deployment: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse>;
}
