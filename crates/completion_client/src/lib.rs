pub mod client;
pub mod client_trait;
pub mod config;
pub mod error;
pub mod models;

pub use client::AzureOpenAIClient;
pub use client_trait::CompletionClientTrait;
pub use config::ClientConfig;
pub use error::{CompletionError, Result};
pub use models::*;
