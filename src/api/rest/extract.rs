use axum::{
    Json, async_trait,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::rest::responses::{ApiError, json_error};

/// `Json<T>` whose rejections use the `{status, message}` envelope with 400.
pub struct JsonBody<T>(pub T);

fn rejection_message(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Request body must be sent with Content-Type: application/json"
        }
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
        JsonRejection::JsonDataError(_) => "Request body has a field of the wrong type",
        _ => "Request body could not be read",
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!(reason = %rejection.body_text(), "rejected request body");
                Err(json_error(
                    StatusCode::BAD_REQUEST,
                    rejection_message(&rejection),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Movement {
        quantity: Option<i64>,
    }

    fn request(content_type: Option<&str>, body: &str) -> Request {
        let mut builder = Request::builder().method("POST").uri("/inventory");
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn extract(req: Request) -> Result<JsonBody<Movement>, ApiError> {
        JsonBody::<Movement>::from_request(req, &()).await
    }

    #[tokio::test]
    async fn well_formed_body_passes_through() {
        let JsonBody(movement) = extract(request(Some("application/json"), r#"{"quantity":5}"#))
            .await
            .unwrap();
        assert_eq!(movement.quantity, Some(5));
    }

    #[tokio::test]
    async fn wrong_typed_field_is_a_fail_envelope() {
        let Err((status, Json(body))) =
            extract(request(Some("application/json"), r#"{"quantity":"5"}"#)).await
        else {
            panic!("string quantity was accepted");
        };
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "status": "fail", "message": "Request body has a field of the wrong type" })
        );
    }

    #[tokio::test]
    async fn missing_content_type_is_a_fail_envelope() {
        let Err((status, Json(body))) = extract(request(None, r#"{"quantity":5}"#)).await else {
            panic!("body without content type was accepted");
        };
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "fail");
    }

    #[tokio::test]
    async fn broken_json_is_a_fail_envelope() {
        let Err((status, Json(body))) =
            extract(request(Some("application/json"), r#"{"quantity":"#)).await
        else {
            panic!("truncated body was accepted");
        };
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Request body is not valid JSON");
    }
}
