use axum::{
    Json,
    extract::{Extension, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::api::rest::middleware::AuthContext;
use crate::api::rest::responses::{ApiError, map_db_error, required};
use crate::application::services::audit::record_audit_query;
use crate::infrastructure::data::repositories::audit_entry_repository::AuditEntryRepository;
use crate::state::AppState;

const DEFAULT_QUERY_LIMIT: usize = 100;
const MAX_QUERY_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    pub user: Option<String>,
    pub action: Option<String>,
    pub limit: Option<usize>,
}

pub async fn list_audit_logs(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(params): Query<AuditLogQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_QUERY_LIMIT)
        .min(MAX_QUERY_LIMIT)
        .max(1);

    record_audit_query("admin_list");
    info!(admin = %ctx.claims.username, limit, "listing audit logs");

    let user = required(params.user.as_deref());
    let action = required(params.action.as_deref()).map(|action| action.to_lowercase());

    let entries = AuditEntryRepository::new(&state.db)
        .query_logs(user.as_deref(), action.as_deref(), limit)
        .await
        .map_err(map_db_error)?;

    Ok(Json(json!({
        "status": "success",
        "results": entries.len(),
        "data": entries,
    })))
}
