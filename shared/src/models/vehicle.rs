//! Vehicle Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Vehicle entity
///
/// A vehicle belongs to a client and carries a default load measure that
/// seeds the quantity of orders delivered with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Vehicle {
    pub id: i64,
    pub client_id: i64,
    /// License plate, stored uppercase
    pub plate: String,
    /// Default load in cubic meters
    pub quantity_m3: f64,
    pub created_at: DateTime<Utc>,
}

/// Create vehicle payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleCreate {
    pub client_id: i64,
    pub plate: String,
    /// Defaults to 0 when absent
    pub quantity_m3: Option<f64>,
}

/// Update vehicle payload (absent field = keep current value)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleUpdate {
    pub plate: Option<String>,
    pub quantity_m3: Option<f64>,
    /// Allows moving the vehicle to another client
    pub client_id: Option<i64>,
}
