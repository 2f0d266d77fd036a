use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use docchat_backend::core::config::AppPaths;
use docchat_backend::core::logging;
use docchat_backend::server;
use docchat_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let paths = AppPaths::new().context("Failed to prepare data directories")?;
    logging::init(&paths);

    let state = match AppState::initialize(paths).await {
        Ok(state) => state,
        Err(err) => {
            tracing::error!("Startup failed: {}", err);
            return Err(err.into());
        }
    };

    let bind_addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    tracing::info!(
        data_dir = %state.paths.data_dir.display(),
        "Listening on http://{}",
        addr
    );

    let app: Router = server::router::router(state.clone());

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
