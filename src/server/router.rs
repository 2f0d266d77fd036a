use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{health, index, post_only, question, upload};
use crate::state::AppState;

/// Creates the application router with all routes and middleware.
///
/// The three pipeline routes answer any method other than POST with 405.
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state);
    let body_limit = upload_limit_bytes(&state);

    Router::new()
        .route("/", get(index::landing_page))
        .route("/health", get(health::health))
        .route("/upload", post(upload::upload_file).fallback(post_only))
        .route("/upload_url", post(upload::upload_url).fallback(post_only))
        .route(
            "/process_question",
            post(question::process_question).fallback(post_only),
        )
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

fn upload_limit_bytes(state: &AppState) -> usize {
    let megabytes = usize::try_from(state.config.server.max_upload_mb).unwrap_or(usize::MAX);
    megabytes.saturating_mul(1024 * 1024)
}

fn build_cors_layer(state: &AppState) -> CorsLayer {
    let configured = &state.config.server.cors_allowed_origins;
    let origins = if configured.is_empty() {
        default_local_origins(state.config.server.port)
    } else {
        configured.clone()
    };

    let allowed_origins = origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}

fn default_local_origins(port: u16) -> Vec<String> {
    vec![
        format!("http://localhost:{}", port),
        format!("http://127.0.0.1:{}", port),
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}
