pub mod chat;
pub mod health;
pub mod topics;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let api_routes = Router::new()
        .route("/api/session", get(chat::session_handler))
        .route("/api/chat", post(chat::chat_handler))
        .route("/api/topics", get(topics::list_topics_handler))
        .route("/api/topics/new", post(topics::new_topic_handler))
        .route("/api/topics/switch", post(topics::switch_topic_handler))
        .route("/api/language", put(topics::language_handler));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
}
