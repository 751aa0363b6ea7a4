mod routes;

use rag_chat::{AppConfig, ChatService};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize environment variables and logging
    dotenv::dotenv().ok();
    env_logger::init();

    if let Err(e) = run().await {
        log::error!("Server stopped: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    log::info!(
        "Starting chat API (model {}, augmentation policy {}, origin {})",
        config.gemini_model,
        config.augmentation_policy,
        config.allowed_origin
    );

    let chat_service = Arc::new(ChatService::from_config(&config)?);
    let app = routes::build_router(chat_service, &config.allowed_origin)?;

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    log::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
