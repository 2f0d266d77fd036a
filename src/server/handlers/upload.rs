use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::core::security::sanitize_file_name;
use crate::extract::{self, DocumentKind};
use crate::rag::IndexError;
use crate::state::AppState;

const NO_FILE_UPLOADED: &str = "No file uploaded";
const NO_FILE_SELECTED: &str = "No file selected";

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// A file part written to the upload directory.
struct SavedUpload {
    file_name: String,
    path: PathBuf,
    kind: DocumentKind,
}

pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let mut multipart = multipart.map_err(|_| ApiError::bad_request(NO_FILE_UPLOADED))?;
    let upload = save_first_file(&state, &mut multipart)
        .await?
        .ok_or_else(|| ApiError::bad_request(NO_FILE_UPLOADED))?;

    let started = Instant::now();
    let path = upload.path.clone();
    let kind = upload.kind;
    let text = tokio::task::spawn_blocking(move || extract::extract(&path, kind))
        .await
        .map_err(|e| ApiError::Internal(format!("Extraction task failed: {}", e)))??;

    tracing::info!(
        file = %upload.file_name,
        kind = %upload.kind,
        chars = text.chars().count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Document text extracted"
    );

    index_text(&state, &upload.file_name, text).await?;

    Ok(Json(json!({
        "message": "File uploaded and processed successfully"
    })))
}

/// Saves the first part that carries a file name, overwriting any earlier
/// upload with the same sanitized name. Parts without a file name are skipped.
async fn save_first_file(
    state: &AppState,
    multipart: &mut Multipart,
) -> Result<Option<SavedUpload>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        let Some(raw_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if raw_name.trim().is_empty() {
            return Err(ApiError::bad_request(NO_FILE_SELECTED));
        }

        let kind = DocumentKind::from_file_name(&raw_name)?;
        let file_name = sanitize_file_name(&raw_name)
            .ok_or_else(|| ApiError::bad_request(NO_FILE_SELECTED))?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        let path = state.paths.upload_path(&file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to save upload: {}", e)))?;

        tracing::info!(file = %file_name, bytes = bytes.len(), "Upload saved");
        return Ok(Some(SavedUpload {
            file_name,
            path,
            kind,
        }));
    }

    Ok(None)
}

pub async fn upload_url(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let url = payload
        .ok()
        .and_then(|Json(body)| body.url)
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request("No URL provided"))?;

    let started = Instant::now();
    let text = state.web.fetch_text(&url).await?;
    tracing::info!(
        url = %url,
        chars = text.chars().count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Web page text extracted"
    );

    index_text(&state, &url, text).await?;

    Ok(Json(json!({
        "message": "URL content processed successfully"
    })))
}

/// Chunks `text` and replaces the index with it.
async fn index_text(state: &AppState, source: &str, text: String) -> Result<(), ApiError> {
    let splitter = state.splitter.clone();
    let chunks = tokio::task::spawn_blocking(move || splitter.split_text(&text))
        .await
        .map_err(|e| ApiError::Internal(format!("Chunking task failed: {}", e)))?;
    if chunks.is_empty() {
        return Err(IndexError::EmptyInput.into());
    }

    tracing::debug!(source = %source, chunks = chunks.len(), "Text chunked");
    state.index.build(source, chunks).await?;
    Ok(())
}
