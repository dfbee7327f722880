use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use topic_chat_server::config::Settings;
use topic_chat_server::handlers::build_router;
use topic_chat_server::logging::ActivityLogger;
use topic_chat_server::services::conversation::ConversationManager;
use topic_chat_server::services::LlmService;
use topic_chat_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,topic_chat_server=debug".to_string()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .init();

    info!("Starting topic chat server...");

    let settings = Settings::load()?;
    info!("Configuration loaded (model {})", settings.llm.model);

    let llm_configured = settings.llm.has_api_key();
    if !llm_configured {
        tracing::warn!("No LLM API key configured, requests go out unauthenticated");
    }

    let llm_service = LlmService::new(settings.llm.clone())?;
    let activity_logger = ActivityLogger::new(settings.logging.clone());

    let conversation_manager = Arc::new(ConversationManager::new(
        Box::new(llm_service),
        activity_logger,
        settings.topic.clone(),
        settings.prompts.system_prompt.clone(),
    ));

    let app = build_router(AppState {
        conversation_manager,
        llm_configured,
    });

    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
