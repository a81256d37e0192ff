use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::inventory::StockAction;
use crate::domain::timestamp;

/// One stock movement in the append-only ledger.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InventoryTransaction {
    pub id: String,
    pub item: String,
    pub quantity: i64,
    pub action: StockAction,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryTransaction {
    pub item: String,
    pub quantity: i64,
    pub action: StockAction,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Stock level of one item as reconstructed from the ledger.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotLine {
    pub item: String,
    pub quantity: i64,
    pub low_stock_level: i64,
}
