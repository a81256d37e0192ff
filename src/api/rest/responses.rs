use axum::{Json, http::StatusCode};
use serde_json::{Map, Value, json};
use tracing::error;

pub type ApiError = (StatusCode, Json<Value>);
pub type ApiResponse = (StatusCode, Json<Value>);

pub fn json_success(message: &str, data: Value) -> ApiResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "success", "message": message, "data": data })),
    )
}

pub fn json_created(message: &str, data: Value) -> ApiResponse {
    (
        StatusCode::CREATED,
        Json(json!({ "status": "success", "message": message, "data": data })),
    )
}

/// Success envelope with extra top-level fields next to `data`.
pub fn json_success_with(
    status: StatusCode,
    message: &str,
    data: Value,
    extra: &[(&str, Value)],
) -> ApiResponse {
    let mut body = Map::new();
    body.insert("status".to_string(), json!("success"));
    body.insert("message".to_string(), json!(message));
    body.insert("data".to_string(), data);
    for (key, value) in extra {
        body.insert((*key).to_string(), value.clone());
    }
    (status, Json(Value::Object(body)))
}

pub fn json_message(message: &str) -> ApiResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "success", "message": message })),
    )
}

pub fn json_error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(
            json!({ "status": if status.is_server_error() { "error" } else { "fail" }, "message": message }),
        ),
    )
}

pub fn missing_fields() -> ApiError {
    json_error(StatusCode::BAD_REQUEST, "Missing fields")
}

pub fn not_found(what: &str) -> ApiError {
    json_error(StatusCode::NOT_FOUND, &format!("{what} not found"))
}

pub fn map_db_error(err: surrealdb::Error) -> ApiError {
    error!(error = %err, "database operation failed");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Database operation failed",
    )
}

/// Trimmed non-empty string or `None`.
pub fn required(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_fail_and_server_errors_error() {
        let (status, Json(body)) = json_error(StatusCode::NOT_FOUND, "Checklist not found");
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({ "status": "fail", "message": "Checklist not found" })
        );

        let (_, Json(body)) = json_error(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(body["status"], "error");
    }

    #[test]
    fn extra_fields_sit_next_to_data() {
        let (status, Json(body)) = json_success_with(
            StatusCode::CREATED,
            "Checklist submitted",
            json!({ "room": "101" }),
            &[("missingItemsAlertQueued", json!(true))],
        );
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["room"], "101");
        assert_eq!(body["missingItemsAlertQueued"], true);
    }

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required(Some("  101 ")), Some("101".to_string()));
        assert_eq!(required(Some("   ")), None);
        assert_eq!(required(None), None);
    }
}
