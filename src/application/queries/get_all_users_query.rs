use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::api::rest::responses::{ApiError, map_db_error};
use crate::domain::models::user::UserView;
use crate::infrastructure::data::repositories::user_repository::UserRepository;
use crate::state::AppState;

pub async fn get_all_users_query(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let users = UserRepository::new(&state.db)
        .get_all()
        .await
        .map_err(map_db_error)?;

    let views: Vec<UserView> = users.iter().map(UserView::from).collect();

    let json_response = json!({
        "status": "success",
        "results": views.len(),
        "data": views,
    });

    Ok(Json(json_response))
}
