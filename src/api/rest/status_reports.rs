use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::api::rest::checklists::parse_date;
use crate::api::rest::extract::JsonBody;
use crate::api::rest::middleware::AuthContext;
use crate::api::rest::responses::{
    ApiError, json_created, json_error, json_message, json_success, map_db_error,
    missing_fields, not_found, required,
};
use crate::application::services::audit::log_audit_event;
use crate::domain::models::status_report::{NewStatusReport, RoomStatus, StatusReportPatch};
use crate::domain::timestamp;
use crate::infrastructure::data::repositories::status_report_repository::{
    StatusReportFilter, StatusReportRepository,
};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReportRequest {
    pub room: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub remarks: Option<String>,
    pub date_time: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusReportListQuery {
    pub date: Option<String>,
    pub status: Option<String>,
}

fn parse_status(raw: &str) -> Result<RoomStatus, ApiError> {
    raw.parse::<RoomStatus>()
        .map_err(|err| json_error(StatusCode::BAD_REQUEST, &err.to_string()))
}

fn parse_date_time(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    timestamp::parse(raw).ok_or_else(|| {
        json_error(
            StatusCode::BAD_REQUEST,
            "Invalid dateTime, expected an ISO 8601 timestamp",
        )
    })
}

/// `[start, end)` of a UTC calendar day.
fn day_bounds(date: NaiveDate) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let start = date.and_hms_opt(0, 0, 0).map(|moment| moment.and_utc());
    let end = date
        .checked_add_days(Days::new(1))
        .and_then(|next| next.and_hms_opt(0, 0, 0))
        .map(|moment| moment.and_utc());
    (start, end)
}

fn non_empty(field: &str, value: Option<String>) -> Result<Option<String>, ApiError> {
    match value {
        Some(value) => required(Some(value.as_str())).map(Some).ok_or_else(|| {
            json_error(StatusCode::BAD_REQUEST, &format!("{field} cannot be empty"))
        }),
        None => Ok(None),
    }
}

pub async fn submit_status_report(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    JsonBody(body): JsonBody<StatusReportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(room), Some(category), Some(status), Some(date_time)) = (
        required(body.room.as_deref()),
        required(body.category.as_deref()),
        required(body.status.as_deref()),
        required(body.date_time.as_deref()),
    ) else {
        return Err(missing_fields());
    };
    let status = parse_status(&status)?;
    let date_time = parse_date_time(&date_time)?;
    let now = timestamp::now();

    let report = StatusReportRepository::new(&state.db)
        .create(NewStatusReport {
            room,
            category,
            status,
            remarks: body.remarks.unwrap_or_default(),
            date_time,
            created_at: now,
            updated_at: now,
        })
        .await
        .map_err(map_db_error)?;

    log_audit_event(
        &state.db,
        "status_report.submitted",
        json!({ "id": report.id, "room": report.room, "status": report.status }),
        Some(&ctx.claims),
    )
    .await;

    Ok(json_created("Status report submitted successfully", json!(report)))
}

pub async fn list_status_reports(
    State(state): State<AppState>,
    Query(query): Query<StatusReportListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut filter = StatusReportFilter::default();

    if let Some(raw) = required(query.date.as_deref()) {
        let (from, until) = day_bounds(parse_date(&raw)?);
        filter.from = from;
        filter.until = until;
    }
    if let Some(raw) = required(query.status.as_deref()) {
        filter.status = Some(parse_status(&raw)?);
    }

    let reports = StatusReportRepository::new(&state.db)
        .list(&filter)
        .await
        .map_err(map_db_error)?;

    Ok(Json(json!({
        "status": "success",
        "results": reports.len(),
        "data": reports,
    })))
}

pub async fn get_status_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let report = StatusReportRepository::new(&state.db)
        .get_by_id(&id)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| not_found("Status report"))?;

    Ok(json_success("Status report found", json!(report)))
}

pub async fn update_status_report(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<StatusReportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let status = match non_empty("Status", body.status)? {
        Some(raw) => Some(parse_status(&raw)?),
        None => None,
    };
    let date_time = match non_empty("dateTime", body.date_time)? {
        Some(raw) => Some(timestamp::format(&parse_date_time(&raw)?)),
        None => None,
    };

    let patch = StatusReportPatch {
        room: non_empty("Room", body.room)?,
        category: non_empty("Category", body.category)?,
        status,
        remarks: body.remarks,
        date_time,
        updated_at: timestamp::now(),
    };

    let report = StatusReportRepository::new(&state.db)
        .update(&id, patch)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| not_found("Status report"))?;

    log_audit_event(
        &state.db,
        "status_report.updated",
        json!({ "id": report.id, "room": report.room, "status": report.status }),
        Some(&ctx.claims),
    )
    .await;

    Ok(json_success("Status report updated", json!(report)))
}

pub async fn delete_status_report(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = StatusReportRepository::new(&state.db)
        .delete(&id)
        .await
        .map_err(map_db_error)?;

    if !deleted {
        return Err(not_found("Status report"));
    }

    log_audit_event(
        &state.db,
        "status_report.deleted",
        json!({ "id": id }),
        Some(&ctx.claims),
    )
    .await;

    Ok(json_message("Status report deleted"))
}
