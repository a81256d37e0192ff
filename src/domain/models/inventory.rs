use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::timestamp;

/// Threshold given to items created through `add` without an explicit level.
pub const DEFAULT_LOW_STOCK_LEVEL: i64 = 10;

/// Upper bound for a single movement and for any stored quantity or level.
pub const MAX_STOCK_QUANTITY: i64 = 1_000_000_000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StockAction {
    Add,
    Use,
}

impl StockAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockAction::Add => "add",
            StockAction::Use => "use",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "add" => Some(StockAction::Add),
            "use" => Some(StockAction::Use),
            _ => None,
        }
    }

    /// Contribution of a movement of `quantity` units to the stock level.
    pub fn signed(&self, quantity: i64) -> i64 {
        match self {
            StockAction::Add => quantity,
            StockAction::Use => -quantity,
        }
    }
}

impl fmt::Display for StockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub item: String,
    pub quantity: i64,
    pub low_stock_level: i64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn is_low_stock(&self) -> bool {
        is_low_stock(self.quantity, self.low_stock_level)
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryItem {
    pub item: String,
    pub quantity: i64,
    pub low_stock_level: i64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InventoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_stock_level: Option<i64>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Stock is low once it reaches the threshold, not only below it.
pub fn is_low_stock(quantity: i64, low_stock_level: i64) -> bool {
    quantity <= low_stock_level
}
