pub mod gemini;
pub mod provider;
pub mod types;

use thiserror::Error;

pub use gemini::GeminiClient;
pub use provider::{Embedder, Generator};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to model API failed: {0}")]
    Http(String),
    #[error("model API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("unexpected model API response: {0}")]
    InvalidResponse(String),
    #[error("model returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Http(err.to_string())
    }
}
