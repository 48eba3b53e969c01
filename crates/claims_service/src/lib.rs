pub mod config;
pub mod controllers;
pub mod conversation;
pub mod error;
pub mod middleware;
pub mod prompts;
pub mod relay;
pub mod server;
pub mod shaper;

pub use config::ServiceConfig;
pub use error::{AppError, Operation, RelayError};
pub use server::{AppState, ClaimsService};
