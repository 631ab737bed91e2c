//! Material Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Material entity (sand, gravel, etc.)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Material {
    pub id: i64,
    pub name: String,
    /// Reference price per cubic meter
    pub price_m3: f64,
    pub created_at: DateTime<Utc>,
}

/// Create material payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialCreate {
    pub name: String,
    /// Defaults to 0 when absent
    pub price_m3: Option<f64>,
}

/// Update material payload (absent field = keep current value)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialUpdate {
    pub name: Option<String>,
    pub price_m3: Option<f64>,
}
