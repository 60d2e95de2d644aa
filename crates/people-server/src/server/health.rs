use axum::{http::StatusCode, response::IntoResponse, Json};

/// Liveness probe. The schema is built before the router exists, so answering at all means healthy.
pub(super) async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "healthy" })))
}
