use std::sync::Arc;
use axum::routing::get;
use axum::Router;
use crate::{handlers, AppState};

/// Every endpoint answers with and without a trailing slash.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::root))
        .route("/fetch_news", get(handlers::fetch_news))
        .route("/fetch_news/", get(handlers::fetch_news))
        .route("/translate", get(handlers::translate))
        .route("/translate/", get(handlers::translate))
        .route("/generate_tts", get(handlers::generate_tts))
        .route("/generate_tts/", get(handlers::generate_tts))
}
