use axum::{Json, response::IntoResponse};
use serde_json::json;

pub async fn health_checker_handler() -> impl IntoResponse {
    Json(json!({
        "status": "success",
        "message": "Hotel operations service is running",
    }))
}
