use std::fmt;
use std::path::PathBuf;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use completion_client::CompletionError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

pub const EMPTY_CONVERSATION_MESSAGE: &str = "Conversation cannot be empty";

/// Which conversation route a failure happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Parse,
    Process,
}

impl Operation {
    pub fn prompt_name(self) -> &'static str {
        match self {
            Operation::Parse => "parse-prompt.txt",
            Operation::Process => "process-prompt.txt",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Parse => f.write_str("parsing"),
            Operation::Process => f.write_str("processing"),
        }
    }
}

/// Failures of the prompt, completion and shaping steps.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Prompt template '{name}' not found in {} location(s)", .searched.len())]
    PromptNotFound { name: String, searched: Vec<PathBuf> },

    #[error("Failed to read prompt template {}: {source}", .path.display())]
    PromptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Completion request failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("Completion result is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Completion result has an unexpected shape: {0}")]
    UnexpectedShape(String),
}

impl RelayError {
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::PromptNotFound { .. } => "prompt_not_found",
            RelayError::PromptRead { .. } => "prompt_read_error",
            RelayError::Completion(_) => "completion_error",
            RelayError::InvalidJson(_) => "invalid_json",
            RelayError::UnexpectedShape(_) => "unexpected_shape",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{}", EMPTY_CONVERSATION_MESSAGE)]
    EmptyConversation,

    #[error("Error {operation} conversation: {source}")]
    Conversation {
        operation: Operation,
        #[source]
        source: RelayError,
    },
}

impl AppError {
    pub fn conversation(operation: Operation, source: RelayError) -> Self {
        AppError::Conversation { operation, source }
    }
}

#[derive(Serialize)]
struct JsonError {
    message: String,
    r#type: String,
}

#[derive(Serialize)]
struct JsonErrorWrapper {
    error: JsonError,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::EmptyConversation => StatusCode::BAD_REQUEST,
            AppError::Conversation {
                source: RelayError::UnexpectedShape(_),
                ..
            } => StatusCode::BAD_GATEWAY,
            AppError::Conversation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::EmptyConversation => EMPTY_CONVERSATION_MESSAGE.to_string(),
            AppError::Conversation { operation, source } => {
                let detail = JsonErrorWrapper {
                    error: JsonError {
                        message: source.to_string(),
                        r#type: source.kind().to_string(),
                    },
                };
                format!(
                    "Error {operation} conversation: {}",
                    serde_json::to_string(&detail).unwrap_or_default()
                )
            }
        };
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(body)
    }
}
