//! Stock bookkeeping: create-or-adjust, direct overwrite and ledger replay.

use std::collections::{BTreeMap, HashMap};

use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, Utc};
use metrics::counter;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::services::audit::log_audit_event;
use crate::application::services::auth::Claims;
use crate::application::services::notifications::{Notification, Notifier};
use crate::domain::models::inventory::{
    DEFAULT_LOW_STOCK_LEVEL, InventoryItem, InventoryPatch, MAX_STOCK_QUANTITY, NewInventoryItem,
    StockAction,
};
use crate::domain::models::transaction::{
    InventoryTransaction, NewInventoryTransaction, SnapshotLine,
};
use crate::domain::timestamp;
use crate::infrastructure::data::db_context::surrealdb_context::Db;
use crate::infrastructure::data::repositories::inventory_repository::InventoryRepository;
use crate::infrastructure::data::repositories::transaction_repository::TransactionRepository;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("{0}")]
    Validation(String),
    #[error("Item not found in inventory")]
    NotFound,
    #[error("Cannot use {requested} units. Only {available} are in stock.")]
    InsufficientStock { requested: i64, available: i64 },
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] surrealdb::Error),
}

impl InventoryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            InventoryError::Validation(_) | InventoryError::InsufficientStock { .. } => {
                StatusCode::BAD_REQUEST
            }
            InventoryError::NotFound => StatusCode::NOT_FOUND,
            InventoryError::Conflict(_) => StatusCode::CONFLICT,
            InventoryError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            InventoryError::Database(_) => "Database operation failed".to_string(),
            other => other.to_string(),
        }
    }
}

/// A validated `add`/`use` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockMovement {
    pub item: String,
    pub quantity: i64,
    pub action: StockAction,
    pub low_stock_level: Option<i64>,
}

impl StockMovement {
    pub fn new(
        item: &str,
        quantity: i64,
        action: &str,
        low_stock_level: Option<i64>,
    ) -> Result<Self, InventoryError> {
        let item = item.trim();
        if item.is_empty() {
            return Err(InventoryError::Validation("Item name is required".to_string()));
        }
        if quantity <= 0 {
            return Err(InventoryError::Validation(
                "Quantity must be a positive whole number".to_string(),
            ));
        }
        validate_bounded("quantity", quantity)?;
        let action = StockAction::parse(action).ok_or_else(|| {
            InventoryError::Validation("Action must be either 'add' or 'use'".to_string())
        })?;
        if let Some(level) = low_stock_level {
            validate_non_negative("lowStockLevel", level)?;
        }

        Ok(Self {
            item: item.to_string(),
            quantity,
            action,
            low_stock_level,
        })
    }
}

#[derive(Debug, Clone)]
pub struct StockOutcome {
    pub item: InventoryItem,
    pub transaction: InventoryTransaction,
    pub created: bool,
    pub low_stock_alert_queued: bool,
}

/// Fields a direct overwrite may replace.
#[derive(Debug, Clone, Default)]
pub struct InventoryUpdate {
    pub item: Option<String>,
    pub quantity: Option<i64>,
    pub low_stock_level: Option<i64>,
}

fn validate_non_negative(field: &str, value: i64) -> Result<(), InventoryError> {
    if value < 0 {
        return Err(InventoryError::Validation(format!(
            "{field} must be zero or greater"
        )));
    }
    validate_bounded(field, value)
}

fn validate_bounded(field: &str, value: i64) -> Result<(), InventoryError> {
    if value > MAX_STOCK_QUANTITY {
        return Err(InventoryError::Validation(format!(
            "{field} cannot exceed {MAX_STOCK_QUANTITY}"
        )));
    }
    Ok(())
}

fn reject(reason: &'static str) {
    counter!("inventory_rejections_total", 1, "reason" => reason);
}

/// Enqueues a low-stock notification when `item` is at or below its level.
fn notify_if_low(notifier: &dyn Notifier, item: &InventoryItem) -> bool {
    if !item.is_low_stock() {
        return false;
    }
    notifier.notify(Notification::LowStock {
        item: item.item.clone(),
        quantity: item.quantity,
        low_stock_level: item.low_stock_level,
    })
}

/// Applies a movement to the row matching `movement.item` (ignoring case),
/// creating the row for an `add` of an unknown item.
pub async fn adjust_stock(
    db: &Db,
    notifier: &dyn Notifier,
    actor: Option<&Claims>,
    movement: StockMovement,
) -> Result<StockOutcome, InventoryError> {
    let inventory = InventoryRepository::new(db);
    let StockMovement {
        item: name,
        quantity,
        action,
        low_stock_level,
    } = movement;

    let (item, created) = match inventory.find_by_name(&name).await? {
        Some(existing) => {
            let applied = match action {
                StockAction::Add => {
                    inventory
                        .increment(&existing.id, quantity, low_stock_level)
                        .await?
                }
                StockAction::Use => {
                    inventory
                        .decrement_if_available(&existing.id, quantity, low_stock_level)
                        .await?
                }
            };

            let current = inventory.get_by_id(&existing.id).await?;
            match (applied, current) {
                (true, Some(current)) => (current, false),
                (false, Some(current)) if action == StockAction::Add => {
                    reject("stock_ceiling");
                    warn!(
                        item = %current.item,
                        requested = quantity,
                        available = current.quantity,
                        "rejected stock addition above ceiling"
                    );
                    return Err(InventoryError::Validation(format!(
                        "Cannot add {quantity} units. Stock of {} would exceed {MAX_STOCK_QUANTITY}.",
                        current.item
                    )));
                }
                (false, Some(current)) => {
                    reject("insufficient_stock");
                    warn!(
                        item = %current.item,
                        requested = quantity,
                        available = current.quantity,
                        "rejected stock usage"
                    );
                    return Err(InventoryError::InsufficientStock {
                        requested: quantity,
                        available: current.quantity,
                    });
                }
                _ => {
                    reject("not_found");
                    return Err(InventoryError::NotFound);
                }
            }
        }
        None if action == StockAction::Use => {
            reject("not_found");
            return Err(InventoryError::NotFound);
        }
        None => {
            let now = timestamp::now();
            let created = inventory
                .create(NewInventoryItem {
                    item: name,
                    quantity,
                    low_stock_level: low_stock_level.unwrap_or(DEFAULT_LOW_STOCK_LEVEL),
                    created_at: now,
                    updated_at: now,
                })
                .await?;
            (created, true)
        }
    };

    let transaction = TransactionRepository::new(db)
        .append(NewInventoryTransaction {
            item: item.item.clone(),
            quantity,
            action,
            timestamp: timestamp::now(),
        })
        .await?;

    counter!("inventory_transactions_total", 1, "action" => action.as_str());
    info!(
        item = %item.item,
        action = %action,
        quantity,
        resulting_quantity = item.quantity,
        "recorded stock movement"
    );

    log_audit_event(
        db,
        "inventory.transaction",
        json!({
            "item": item.item,
            "quantity": quantity,
            "action": action,
            "resultingQuantity": item.quantity,
        }),
        actor,
    )
    .await;

    let low_stock_alert_queued = notify_if_low(notifier, &item);

    Ok(StockOutcome {
        item,
        transaction,
        created,
        low_stock_alert_queued,
    })
}

/// Overwrites an item's fields without touching the ledger.
pub async fn update_item(
    db: &Db,
    notifier: &dyn Notifier,
    actor: Option<&Claims>,
    id: &str,
    update: InventoryUpdate,
) -> Result<(InventoryItem, bool), InventoryError> {
    let item = match update.item {
        Some(name) => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(InventoryError::Validation(
                    "Item name cannot be empty".to_string(),
                ));
            }
            Some(name)
        }
        None => None,
    };
    if let Some(quantity) = update.quantity {
        validate_non_negative("quantity", quantity)?;
    }
    if let Some(level) = update.low_stock_level {
        validate_non_negative("lowStockLevel", level)?;
    }

    let inventory = InventoryRepository::new(db);
    if inventory.get_by_id(id).await?.is_none() {
        return Err(InventoryError::NotFound);
    }

    if let Some(name) = &item {
        if let Some(other) = inventory.find_by_name(name).await? {
            if other.id != id {
                reject("duplicate_name");
                return Err(InventoryError::Conflict(format!(
                    "An inventory item named '{}' already exists",
                    other.item
                )));
            }
        }
    }

    let patch = InventoryPatch {
        item,
        quantity: update.quantity,
        low_stock_level: update.low_stock_level,
        updated_at: timestamp::now(),
    };
    let updated = inventory
        .update(id, patch)
        .await?
        .ok_or(InventoryError::NotFound)?;

    log_audit_event(
        db,
        "inventory.updated",
        json!({
            "id": updated.id,
            "item": updated.item,
            "quantity": updated.quantity,
            "lowStockLevel": updated.low_stock_level,
        }),
        actor,
    )
    .await;

    let queued = notify_if_low(notifier, &updated);
    Ok((updated, queued))
}

/// Net quantity per item name: sum of `add` minus sum of `use`, saturating
/// at the `i64` range.
pub fn replay_ledger(transactions: &[InventoryTransaction]) -> BTreeMap<String, i64> {
    let mut totals: BTreeMap<String, i128> = BTreeMap::new();
    for transaction in transactions {
        let total = totals.entry(transaction.item.clone()).or_insert(0);
        *total = total.saturating_add(i128::from(
            transaction.action.signed(transaction.quantity),
        ));
    }
    totals
        .into_iter()
        .map(|(item, total)| {
            let clamped = total.clamp(i128::from(i64::MIN), i128::from(i64::MAX));
            (item, i64::try_from(clamped).unwrap_or_default())
        })
        .collect()
}

/// Last representable instant of `date` at the stored precision.
pub fn end_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .map(|moment| moment.and_utc())
}

/// Stock levels as of the end of `date`, rebuilt from the ledger.
pub async fn snapshot_at(db: &Db, date: NaiveDate) -> Result<Vec<SnapshotLine>, InventoryError> {
    let until = end_of_day(date)
        .ok_or_else(|| InventoryError::Validation("Invalid snapshot date".to_string()))?;

    let transactions = TransactionRepository::new(db).list_until(&until).await?;
    let levels: HashMap<String, i64> = InventoryRepository::new(db)
        .list()
        .await?
        .into_iter()
        .map(|item| (item.item, item.low_stock_level))
        .collect();

    Ok(assemble_snapshot(replay_ledger(&transactions), &levels))
}

fn assemble_snapshot(
    totals: BTreeMap<String, i64>,
    levels: &HashMap<String, i64>,
) -> Vec<SnapshotLine> {
    totals
        .into_iter()
        .map(|(item, quantity)| SnapshotLine {
            low_stock_level: levels.get(&item).copied().unwrap_or(0),
            item,
            quantity,
        })
        .collect()
}
