use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::provider::{Embedder, Generator};
use super::types::{
    ApiErrorEnvelope, BatchEmbedContentsRequest, BatchEmbedContentsResponse, Content,
    EmbedContentRequest, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    TaskType,
};
use super::LlmError;
use crate::core::config::service::GeminiConfig;

/// `batchEmbedContents` accepts at most this many requests per call.
const MAX_EMBED_BATCH: usize = 100;

#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    embedding_model: String,
    generation_model: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig, api_key: String) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            embedding_model: config.embedding_model.clone(),
            generation_model: config.generation_model.clone(),
            client,
        })
    }

    fn method_url(&self, model: &str, method: &str) -> String {
        format!("{}/{}:{}", self.base_url, model, method)
    }

    async fn post<B, R>(&self, url: &str, body: &B) -> Result<R, LlmError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let res = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(api_error(res).await);
        }

        res.json::<R>()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    async fn embed_batch(
        &self,
        texts: &[String],
        task_type: TaskType,
    ) -> Result<Vec<Vec<f32>>, LlmError> {
        let url = self.method_url(&self.embedding_model, "batchEmbedContents");
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(MAX_EMBED_BATCH) {
            let body = BatchEmbedContentsRequest {
                requests: batch
                    .iter()
                    .map(|text| EmbedContentRequest::new(&self.embedding_model, text, task_type))
                    .collect(),
            };

            let response: BatchEmbedContentsResponse = self.post(&url, &body).await?;
            if response.embeddings.len() != batch.len() {
                return Err(LlmError::InvalidResponse(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    response.embeddings.len()
                )));
            }

            for embedding in response.embeddings {
                if embedding.values.is_empty() {
                    return Err(LlmError::EmptyResponse);
                }
                vectors.push(embedding.values);
            }
        }

        Ok(vectors)
    }
}

async fn api_error(res: Response) -> LlmError {
    let status = res.status().as_u16();
    let text = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
        .map(|envelope| envelope.error.message)
        .unwrap_or(text);
    LlmError::Api { status, message }
}

#[async_trait]
impl Embedder for GeminiClient {
    fn model(&self) -> &str {
        &self.embedding_model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.embed_batch(texts, TaskType::RetrievalDocument).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let mut vectors = self
            .embed_batch(&[text.to_string()], TaskType::RetrievalQuery)
            .await?;
        vectors.pop().ok_or(LlmError::EmptyResponse)
    }
}

#[async_trait]
impl Generator for GeminiClient {
    fn model(&self) -> &str {
        &self.generation_model
    }

    async fn generate(&self, prompt: &str, temperature: f64) -> Result<String, LlmError> {
        let url = self.method_url(&self.generation_model, "generateContent");
        let body = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            generation_config: GenerationConfig { temperature },
        };

        let response: GenerateContentResponse = self.post(&url, &body).await?;
        if let Some(text) = response.text() {
            return Ok(text);
        }

        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(LlmError::InvalidResponse(format!("prompt blocked: {}", reason)));
        }
        if let Some(reason) = response
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
        {
            tracing::warn!(finish_reason = reason, "Model returned no text");
        }
        Err(LlmError::EmptyResponse)
    }
}
