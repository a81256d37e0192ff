use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::rest::extract::JsonBody;
use crate::api::rest::middleware::AuthContext;
use crate::api::rest::responses::{ApiError, json_created, json_error, missing_fields, required};
use crate::application::services::accounts::create_account;
use crate::application::services::audit::log_audit_event;
use crate::domain::models::user::{Role, UserView};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

pub async fn create_user_command(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    JsonBody(body): JsonBody<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(username), Some(password), Some(role)) = (
        required(body.username.as_deref()),
        body.password,
        required(body.role.as_deref()),
    ) else {
        return Err(missing_fields());
    };

    let role = role
        .parse::<Role>()
        .map_err(|message| json_error(StatusCode::BAD_REQUEST, &message))?;

    let user = create_account(&state.db, &username, &password, role)
        .await
        .map_err(|err| json_error(err.status_code(), &err.message()))?;

    log_audit_event(
        &state.db,
        "user.created",
        json!({ "id": user.id, "username": user.username, "role": user.role }),
        Some(&ctx.claims),
    )
    .await;

    Ok(json_created("User created", json!(UserView::from(&user))))
}
