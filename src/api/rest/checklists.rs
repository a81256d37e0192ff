use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::info;

use crate::api::rest::extract::JsonBody;
use crate::api::rest::middleware::AuthContext;
use crate::api::rest::responses::{
    ApiError, json_error, json_message, json_success, json_success_with, map_db_error,
    missing_fields, not_found, required,
};
use crate::application::services::audit::log_audit_event;
use crate::application::services::notifications::Notification;
use crate::domain::models::checklist::{ChecklistPatch, NewChecklist};
use crate::domain::timestamp;
use crate::infrastructure::data::repositories::checklist_repository::ChecklistRepository;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChecklistRequest {
    pub room: Option<String>,
    pub date: Option<String>,
    pub items: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
pub struct ChecklistListQuery {
    pub room: Option<String>,
}

#[derive(Deserialize)]
pub struct MissingItemsQuery {
    pub date: Option<String>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        json_error(
            StatusCode::BAD_REQUEST,
            "Invalid date, expected YYYY-MM-DD",
        )
    })
}

/// Item values are kept as submitted; non-string values are stored as
/// their JSON text.
fn normalize_items(items: Map<String, Value>) -> BTreeMap<String, String> {
    items
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(text) => text,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect()
}

pub async fn submit_checklist(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    JsonBody(body): JsonBody<ChecklistRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(room), Some(date), Some(items)) =
        (required(body.room.as_deref()), required(body.date.as_deref()), body.items)
    else {
        return Err(missing_fields());
    };
    let date = parse_date(&date)?;
    let now = timestamp::now();

    let checklist = ChecklistRepository::new(&state.db)
        .create(NewChecklist {
            room,
            date,
            items: normalize_items(items),
            created_at: now,
            updated_at: now,
        })
        .await
        .map_err(map_db_error)?;

    log_audit_event(
        &state.db,
        "checklist.submitted",
        json!({ "id": checklist.id, "room": checklist.room, "date": checklist.date }),
        Some(&ctx.claims),
    )
    .await;

    let missing = checklist.missing_items();
    let alert_queued = if missing.is_empty() {
        false
    } else {
        info!(room = %checklist.room, date = %checklist.date, missing = missing.len(), "checklist has missing items");
        state.notifier.notify(Notification::MissingItems {
            room: checklist.room.clone(),
            date: checklist.date,
            items: missing,
        })
    };

    Ok(json_success_with(
        StatusCode::CREATED,
        "Checklist submitted successfully",
        json!(checklist),
        &[("missingItemsAlertQueued", json!(alert_queued))],
    ))
}

pub async fn list_checklists(
    State(state): State<AppState>,
    Query(query): Query<ChecklistListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let room = required(query.room.as_deref());
    let checklists = ChecklistRepository::new(&state.db)
        .list(room.as_deref())
        .await
        .map_err(map_db_error)?;

    Ok(Json(json!({
        "status": "success",
        "results": checklists.len(),
        "data": checklists,
    })))
}

pub async fn list_missing_items(
    State(state): State<AppState>,
    Query(query): Query<MissingItemsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repository = ChecklistRepository::new(&state.db);
    let checklists = match required(query.date.as_deref()) {
        Some(raw) => repository.list_for_date(parse_date(&raw)?).await,
        None => repository.list(None).await,
    }
    .map_err(map_db_error)?;

    let summaries: Vec<Value> = checklists
        .iter()
        .filter_map(|checklist| {
            let missing = checklist.missing_items();
            (!missing.is_empty()).then(|| {
                json!({
                    "id": checklist.id,
                    "room": checklist.room,
                    "date": checklist.date,
                    "missingItems": missing,
                })
            })
        })
        .collect();

    Ok(Json(json!({
        "status": "success",
        "results": summaries.len(),
        "data": summaries,
    })))
}

pub async fn get_checklist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let checklist = ChecklistRepository::new(&state.db)
        .get_by_id(&id)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| not_found("Checklist"))?;

    Ok(json_success("Checklist found", json!(checklist)))
}

pub async fn update_checklist(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<ChecklistRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let room = match body.room {
        Some(room) => Some(required(Some(room.as_str())).ok_or_else(|| {
            json_error(StatusCode::BAD_REQUEST, "Room cannot be empty")
        })?),
        None => None,
    };
    let date = match body.date {
        Some(raw) => Some(parse_date(&raw)?),
        None => None,
    };
    let items = match body.items {
        Some(items) if items.is_empty() => {
            return Err(json_error(StatusCode::BAD_REQUEST, "Items cannot be empty"));
        }
        Some(items) => Some(normalize_items(items)),
        None => None,
    };

    let checklist = ChecklistRepository::new(&state.db)
        .update(
            &id,
            ChecklistPatch {
                room,
                date,
                items,
                updated_at: timestamp::now(),
            },
        )
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| not_found("Checklist"))?;

    log_audit_event(
        &state.db,
        "checklist.updated",
        json!({ "id": checklist.id, "room": checklist.room, "date": checklist.date }),
        Some(&ctx.claims),
    )
    .await;

    Ok(json_success("Checklist updated", json!(checklist)))
}

pub async fn delete_checklist(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = ChecklistRepository::new(&state.db)
        .delete(&id)
        .await
        .map_err(map_db_error)?;

    if !deleted {
        return Err(not_found("Checklist"));
    }

    log_audit_event(
        &state.db,
        "checklist.deleted",
        json!({ "id": id }),
        Some(&ctx.claims),
    )
    .await;

    Ok(json_message("Checklist deleted"))
}
