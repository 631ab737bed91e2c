//! Closure Model
//!
//! A closure ("fechamento") is a billing batch: it groups a client's orders
//! into one payable total. The `total` field is derived from the member
//! orders and maintained transactionally by the server's engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closure lifecycle status: OPEN until finalized, SETTLED is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "closure_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum ClosureStatus {
    Open,
    Settled,
}

/// Closure entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Closure {
    pub id: i64,
    pub client_id: i64,
    pub description: Option<String>,
    /// Sum of `total_value` over all member orders
    pub total: f64,
    pub status: ClosureStatus,
    pub created_at: DateTime<Utc>,
}

/// Create closure payload: a batch of existing order ids to attach
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosureCreate {
    pub client_id: i64,
    pub description: Option<String>,
    pub order_ids: Vec<i64>,
}

/// Update closure payload (absent field = keep current value)
///
/// Status may only move forward; SETTLED is terminal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClosureUpdate {
    pub description: Option<String>,
    pub status: Option<ClosureStatus>,
}
