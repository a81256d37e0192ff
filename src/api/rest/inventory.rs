use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::rest::checklists::parse_date;
use crate::api::rest::extract::JsonBody;
use crate::api::rest::middleware::AuthContext;
use crate::api::rest::responses::{
    ApiError, json_error, json_message, json_success, json_success_with, map_db_error,
    missing_fields, not_found, required,
};
use crate::application::services::audit::log_audit_event;
use crate::application::services::inventory::{
    self, InventoryError, InventoryUpdate, StockMovement,
};
use crate::infrastructure::data::repositories::inventory_repository::InventoryRepository;
use crate::infrastructure::data::repositories::transaction_repository::TransactionRepository;
use crate::state::AppState;

const DEFAULT_LEDGER_LIMIT: usize = 100;
const MAX_LEDGER_LIMIT: usize = 500;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRequest {
    pub item: Option<String>,
    pub quantity: Option<i64>,
    pub action: Option<String>,
    #[serde(alias = "lowStockThreshold")]
    pub low_stock_level: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdateRequest {
    pub item: Option<String>,
    pub quantity: Option<i64>,
    #[serde(alias = "lowStockThreshold")]
    pub low_stock_level: Option<i64>,
}

#[derive(Deserialize)]
pub struct LedgerQuery {
    pub item: Option<String>,
    pub limit: Option<usize>,
}

fn map_inventory_error(err: InventoryError) -> ApiError {
    match err {
        InventoryError::Database(err) => map_db_error(err),
        other => json_error(other.status_code(), &other.message()),
    }
}

pub async fn adjust_inventory(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    JsonBody(body): JsonBody<StockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(item), Some(quantity), Some(action)) = (
        required(body.item.as_deref()),
        body.quantity,
        required(body.action.as_deref()),
    ) else {
        return Err(missing_fields());
    };

    let movement = StockMovement::new(&item, quantity, &action, body.low_stock_level)
        .map_err(map_inventory_error)?;

    let outcome = inventory::adjust_stock(
        &state.db,
        state.notifier.as_ref(),
        Some(&ctx.claims),
        movement,
    )
    .await
    .map_err(map_inventory_error)?;

    let message = if outcome.created {
        "Inventory item created"
    } else {
        "Inventory updated"
    };

    Ok(json_success_with(
        StatusCode::OK,
        message,
        json!(outcome.item),
        &[
            ("transaction", json!(outcome.transaction)),
            ("lowStockAlertQueued", json!(outcome.low_stock_alert_queued)),
        ],
    ))
}

pub async fn list_inventory(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let items = InventoryRepository::new(&state.db)
        .list()
        .await
        .map_err(map_db_error)?;

    Ok(Json(json!({
        "status": "success",
        "results": items.len(),
        "data": items,
    })))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<LedgerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEDGER_LIMIT)
        .clamp(1, MAX_LEDGER_LIMIT);
    let item = required(query.item.as_deref());

    let transactions = TransactionRepository::new(&state.db)
        .list_recent(item.as_deref(), limit)
        .await
        .map_err(map_db_error)?;

    Ok(Json(json!({
        "status": "success",
        "results": transactions.len(),
        "data": transactions,
    })))
}

pub async fn inventory_snapshot(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(raw_date): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let date = parse_date(&raw_date)?;
    let lines = inventory::snapshot_at(&state.db, date)
        .await
        .map_err(map_inventory_error)?;

    log_audit_event(
        &state.db,
        "inventory.snapshot",
        json!({ "date": date, "items": lines.len() }),
        Some(&ctx.claims),
    )
    .await;

    Ok(json_success("Inventory snapshot", json!(lines)))
}

pub async fn get_inventory_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let item = InventoryRepository::new(&state.db)
        .get_by_id(&id)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| not_found("Inventory item"))?;

    Ok(json_success("Inventory item found", json!(item)))
}

pub async fn update_inventory_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<InventoryUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let update = InventoryUpdate {
        item: body.item,
        quantity: body.quantity,
        low_stock_level: body.low_stock_level,
    };

    let (item, alert_queued) = inventory::update_item(
        &state.db,
        state.notifier.as_ref(),
        Some(&ctx.claims),
        &id,
        update,
    )
    .await
    .map_err(|err| match err {
        InventoryError::NotFound => not_found("Inventory item"),
        other => map_inventory_error(other),
    })?;

    Ok(json_success_with(
        StatusCode::OK,
        "Inventory item updated",
        json!(item),
        &[("lowStockAlertQueued", json!(alert_queued))],
    ))
}

pub async fn delete_inventory_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let repository = InventoryRepository::new(&state.db);
    let existing = repository
        .get_by_id(&id)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| not_found("Inventory item"))?;

    if !repository.delete(&id).await.map_err(map_db_error)? {
        return Err(not_found("Inventory item"));
    }

    log_audit_event(
        &state.db,
        "inventory.deleted",
        json!({ "id": id, "item": existing.item }),
        Some(&ctx.claims),
    )
    .await;

    Ok(json_message("Inventory item deleted"))
}
