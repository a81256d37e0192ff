use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::timestamp;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Arrival,
    Occupied,
    Departure,
    VacantReady,
    VacantNotReady,
    OutOfOrder,
    OutOfService,
}

impl RoomStatus {
    pub const ALL: [RoomStatus; 7] = [
        RoomStatus::Arrival,
        RoomStatus::Occupied,
        RoomStatus::Departure,
        RoomStatus::VacantReady,
        RoomStatus::VacantNotReady,
        RoomStatus::OutOfOrder,
        RoomStatus::OutOfService,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Arrival => "arrival",
            RoomStatus::Occupied => "occupied",
            RoomStatus::Departure => "departure",
            RoomStatus::VacantReady => "vacant_ready",
            RoomStatus::VacantNotReady => "vacant_not_ready",
            RoomStatus::OutOfOrder => "out_of_order",
            RoomStatus::OutOfService => "out_of_service",
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRoomStatus(pub String);

impl fmt::Display for UnknownRoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let allowed = RoomStatus::ALL
            .iter()
            .map(RoomStatus::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "Unknown status '{}'. Expected one of: {allowed}", self.0)
    }
}

impl FromStr for RoomStatus {
    type Err = UnknownRoomStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        RoomStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownRoomStatus(value.to_string()))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub id: String,
    pub room: String,
    pub category: String,
    pub status: RoomStatus,
    #[serde(default)]
    pub remarks: String,
    #[serde(with = "timestamp")]
    pub date_time: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewStatusReport {
    pub room: String,
    pub category: String,
    pub status: RoomStatus,
    pub remarks: String,
    #[serde(with = "timestamp")]
    pub date_time: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StatusReportPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RoomStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}
