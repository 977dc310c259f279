use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use zerochat_backend::core::config::AppConfig;
use zerochat_backend::core::logging;
use zerochat_backend::server::router;
use zerochat_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration from environment")?;
    logging::init(&config.log_dir);

    let bind_addr = format!("127.0.0.1:{}", config.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let state = AppState::initialize(config);
    let app: Router = router::router(state);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
