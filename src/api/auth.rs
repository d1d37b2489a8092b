use std::collections::HashMap;

use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::AppState;

pub const ACCESS_KEY_HEADER: &str = "x-functions-key";
const ACCESS_KEY_QUERY: &str = "code";

/// Route-level access key check. Open when no key is configured.
pub async fn require_access_key(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.access_key.as_deref() else {
        return next.run(req).await;
    };

    let presented = req
        .headers()
        .get(ACCESS_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| query.get(ACCESS_KEY_QUERY).map(String::as_str));

    if !presented.is_some_and(|key| keys_match(key, expected)) {
        warn!(path = %req.uri().path(), "rejected request with missing or invalid access key");
        return unauthorized_response();
    }

    next.run(req).await
}

/// Compares every byte regardless of where the first mismatch is.
fn keys_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn unauthorized_response() -> Response {
    (StatusCode::UNAUTHORIZED, "unauthorized").into_response()
}
