use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Shipment lifecycle status. Serialized kebab-case on the wire and in the
/// database (`in-progress`), matching the external tracking pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ShipmentStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "pending",
            ShipmentStatus::InProgress => "in-progress",
            ShipmentStatus::Completed => "completed",
            ShipmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipmentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ShipmentStatus::Pending),
            "in-progress" => Ok(ShipmentStatus::InProgress),
            "completed" => Ok(ShipmentStatus::Completed),
            "cancelled" => Ok(ShipmentStatus::Cancelled),
            other => Err(anyhow::anyhow!("unknown shipment status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A point on a route. Immutable once created; creation sets `name` and
/// `address` to the same literal text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// Customer contact denormalized onto the shipment. The persistence layer
/// dedupes by email at insert time, nothing stronger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// The aggregate root: one trackable package and its journey. The flattened
/// route is `[start_location, ...stopovers, end_location]` and
/// `current_location_index` points into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: String,
    pub name: String,
    pub status: ShipmentStatus,
    pub current_location_index: i32,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: Customer,
    pub start_location: Location,
    pub end_location: Location,
    pub stopovers: Vec<Location>,
}

impl Shipment {
    /// Length of the flattened route: start + stopovers + end.
    pub fn route_len(&self) -> i32 {
        self.stopovers.len() as i32 + 2
    }
}

// No Serialize on purpose: the credential row must never be able to reach a
// response body.
#[derive(Debug, Deserialize, sqlx::FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
