use axum::{extract::State, http::StatusCode};

use super::AppState;

/// POST /api/completions — raw text prompt in, plain text completion out.
pub async fn completions(State(state): State<AppState>, prompt: String) -> (StatusCode, String) {
    state.relay.handle(&prompt).await
}

pub async fn health() -> &'static str {
    "ok"
}
