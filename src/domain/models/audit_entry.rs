use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::models::user::Role;
use crate::domain::timestamp;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuditEntry {
    pub id: String,
    pub action: String,
    pub details: Value,
    pub username: Option<String>,
    pub role: Option<Role>,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone)]
pub struct NewAuditEntry {
    pub action: String,
    pub details: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}
