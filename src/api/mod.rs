use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

pub mod auth;
pub mod handlers;
pub mod relay;

use handlers::{completions, health};
use relay::CompletionRelay;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<CompletionRelay>,
    pub access_key: Option<Arc<str>>,
}

/// Full application router with shared state attached.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/completions", post(completions))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_access_key,
        ));

    Router::new()
        .merge(protected)
        .route("/api/health", get(health))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}
