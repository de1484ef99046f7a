use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // The dashboard is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::service_info))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        // Prediction endpoint
        .route("/predict", post(handlers::predict))
        // Stream consumption endpoints
        .route("/stream/fetch", get(handlers::fetch_stream))
        .route("/stream/reset", post(handlers::reset_stream))
        .route("/stream/latest", get(handlers::latest_play))
        .route("/stream/status", get(handlers::stream_status))
        .with_state(state)
        .layer(cors)
}
