pub mod health;
pub mod notifications;

use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::state::AppState;

/// Build the complete API router with all routes.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .merge(health::router())
        .merge(notifications::router())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}
