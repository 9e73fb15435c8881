use axum::{http::StatusCode, response::{IntoResponse, Redirect}, Json};
use serde_json::json;

pub async fn root() -> Redirect {
    Redirect::to("/dashboard")
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
