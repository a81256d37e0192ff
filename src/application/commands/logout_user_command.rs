use axum::{
    Json,
    extract::{Extension, State},
    http::{StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use serde_json::json;
use tracing::info;

use crate::api::rest::middleware::AuthContext;
use crate::application::services::auth::expired_session_cookie;
use crate::state::AppState;

pub async fn logout_user_command(
    State(state): State<AppState>,
    Extension(auth_ctx): Extension<AuthContext>,
) -> impl IntoResponse {
    state
        .sessions
        .revoke(&auth_ctx.token, auth_ctx.claims.exp)
        .await;
    info!(username = %auth_ctx.claims.username, "user logged out");

    let json_response = json!({
        "status": "success",
        "message": "Logged out successfully",
    });

    (
        StatusCode::OK,
        [(SET_COOKIE, expired_session_cookie())],
        Json(json_response),
    )
}
