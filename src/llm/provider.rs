use async_trait::async_trait;

use super::LlmError;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// embedding model identifier, recorded with the index
    fn model(&self) -> &str;

    /// embed document chunks, one vector per input, in input order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;

    /// embed a search query
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors.pop().ok_or(LlmError::EmptyResponse)
    }
}

#[async_trait]
pub trait Generator: Send + Sync {
    fn model(&self) -> &str;

    /// single-turn completion of `prompt`
    async fn generate(&self, prompt: &str, temperature: f64) -> Result<String, LlmError>;
}
