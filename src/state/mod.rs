use std::sync::Arc;

use crate::core::config::{AppConfig, AppPaths, ConfigService};
use crate::extract::WebExtractor;
use crate::llm::{Embedder, GeminiClient, Generator};
use crate::rag::{AnswerGenerator, IndexManager, RecursiveTextSplitter, SqliteVectorStore};

pub mod error;

use error::InitializationError;

/// Application state shared across all routes.
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: AppConfig,
    pub splitter: RecursiveTextSplitter,
    pub index: IndexManager,
    pub answers: AnswerGenerator,
    pub web: WebExtractor,
}

impl AppState {
    /// Loads configuration, requires the API key and opens the persisted
    /// index under `paths`.
    pub async fn initialize(paths: AppPaths) -> Result<Arc<Self>, InitializationError> {
        let paths = Arc::new(paths);
        let config_service = ConfigService::new(paths.clone());
        let config = config_service.load_config()?;
        let api_key = config_service.api_key()?;

        tracing::info!(
            config_path = %config_service.config_path().display(),
            embedding_model = %config.gemini.embedding_model,
            generation_model = %config.gemini.generation_model,
            "Configuration loaded"
        );

        let gemini =
            Arc::new(GeminiClient::new(&config.gemini, api_key).map_err(InitializationError::Llm)?);

        Self::with_models(paths, config, gemini.clone(), gemini).await
    }

    /// Builds the state around the given model backends.
    pub async fn with_models(
        paths: Arc<AppPaths>,
        config: AppConfig,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Result<Arc<Self>, InitializationError> {
        let store = SqliteVectorStore::open(paths.index_db_path())
            .await
            .map_err(InitializationError::Index)?;
        tracing::debug!(path = %store.db_path().display(), "Vector index opened");

        let web = WebExtractor::new(&config.web).map_err(InitializationError::Web)?;

        Ok(Arc::new(AppState {
            splitter: RecursiveTextSplitter::from_config(&config.chunking),
            index: IndexManager::new(Arc::new(store), embedder),
            answers: AnswerGenerator::new(generator, config.gemini.temperature),
            web,
            paths,
            config,
        }))
    }
}
