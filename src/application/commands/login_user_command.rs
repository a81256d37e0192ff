use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::api::rest::extract::JsonBody;
use crate::api::rest::responses::{ApiError, json_error, map_db_error, required};
use crate::application::services::audit::log_login_attempt;
use crate::application::services::auth::{create_session_token, session_cookie, verify_password};
use crate::domain::models::user::UserView;
use crate::infrastructure::data::repositories::user_repository::UserRepository;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

fn invalid_credentials() -> ApiError {
    json_error(StatusCode::UNAUTHORIZED, "Invalid username or password")
}

pub async fn login_user_command(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(username), Some(password)) = (
        required(body.username.as_deref()),
        body.password.filter(|password| !password.is_empty()),
    ) else {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "Username and password are required",
        ));
    };

    let user = UserRepository::new(&state.db)
        .get_by_username(&username)
        .await
        .map_err(map_db_error)?;

    let Some(user) = user else {
        log_login_attempt(&state.db, &username, "failure", None).await;
        return Err(invalid_credentials());
    };

    let password_is_valid = verify_password(&password, &user.password).map_err(|err| {
        error!(username = %user.username, "stored password hash is unreadable: {err}");
        json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to verify password",
        )
    })?;

    if !password_is_valid {
        log_login_attempt(&state.db, &username, "failure", Some(user.role)).await;
        return Err(invalid_credentials());
    }

    let (token, _claims) = create_session_token(&state.config.auth, &user).map_err(|err| {
        error!("failed to issue session token: {err}");
        json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create session",
        )
    })?;

    log_login_attempt(&state.db, &user.username, "success", Some(user.role)).await;
    info!(username = %user.username, role = %user.role, "user logged in");

    let cookie = session_cookie(&token, state.config.auth.expiration_minutes);
    let json_response = json!({
        "status": "success",
        "message": "Logged in successfully",
        "data": {
            "token": token,
            "user": UserView::from(&user),
        },
    });

    Ok((StatusCode::OK, [(SET_COOKIE, cookie)], Json(json_response)))
}
