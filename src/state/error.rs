use thiserror::Error;

use crate::core::config::ConfigError;
use crate::extract::ExtractError;
use crate::llm::LlmError;
use crate::rag::StoreError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("GOOGLE_API_KEY is not set correctly")]
    MissingApiKey,

    #[error("Failed to load configuration: {0}")]
    Config(#[source] ConfigError),

    #[error("Failed to open vector index: {0}")]
    Index(#[source] StoreError),

    #[error("Failed to initialize model client: {0}")]
    Llm(#[source] LlmError),

    #[error("Failed to initialize web client: {0}")]
    Web(#[source] ExtractError),
}

impl From<ConfigError> for InitializationError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingApiKey => InitializationError::MissingApiKey,
            other => InitializationError::Config(other),
        }
    }
}
