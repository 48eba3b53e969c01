use completion_client::{ChatCompletionRequest, ChatMessage, SamplingConfig};

use crate::error::AppError;

/// Raw call transcript that is known to contain more than whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript(String);

impl Transcript {
    pub fn new(raw: impl Into<String>) -> Result<Self, AppError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(AppError::EmptyConversation);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// System instruction followed by the user transcript, always in that order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionExchange {
    messages: [ChatMessage; 2],
}

impl CompletionExchange {
    pub fn new(instruction: impl Into<String>, transcript: &Transcript) -> Self {
        Self {
            messages: [
                ChatMessage::system(instruction),
                ChatMessage::user(transcript.as_str()),
            ],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn into_request(self, sampling: SamplingConfig) -> ChatCompletionRequest {
        ChatCompletionRequest::new(Vec::from(self.messages), sampling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use completion_client::Role;

    #[test]
    fn transcript_rejects_blank_input() {
        for raw in ["", "   ", "\n\t  \r\n"] {
            assert!(
                matches!(Transcript::new(raw), Err(AppError::EmptyConversation)),
                "input {raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn transcript_keeps_original_text() {
        let transcript = Transcript::new("  Hi there.  ").unwrap();
        assert_eq!(transcript.as_str(), "  Hi there.  ");
    }

    #[test]
    fn exchange_puts_instruction_before_transcript() {
        let transcript = Transcript::new("Hi I just had a car accident.").unwrap();
        let exchange = CompletionExchange::new("Label each speaker.", &transcript);

        let messages = exchange.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "Label each speaker.");
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "Hi I just had a car accident.");
    }

    #[test]
    fn into_request_carries_sampling() {
        let transcript = Transcript::new("hello").unwrap();
        let request = CompletionExchange::new("instr", &transcript)
            .into_request(SamplingConfig::default());

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.sampling, SamplingConfig::default());
    }
}
