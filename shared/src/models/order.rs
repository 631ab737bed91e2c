//! Order Model
//!
//! An order is one delivery line item: a material at a captured unit price,
//! a quantity in cubic meters, and the stored derived total. Orders may be
//! attached to a billing closure; membership changes drive the closure
//! total recomputation in the server's engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Order lifecycle status
///
/// PENDING on creation, IN_CLOSURE once attached to a closure, PAID when
/// the closure is settled (or when set individually).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum OrderStatus {
    Pending,
    InClosure,
    Paid,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub client_id: i64,
    pub material_id: i64,
    /// Price per cubic meter captured at order time (not re-read from the
    /// material later)
    pub unit_price: f64,
    /// Quantity in cubic meters
    pub quantity: f64,
    /// Stored derived value, always `quantity * unit_price`
    pub total_value: f64,
    pub vehicle_id: Option<i64>,
    pub closure_id: Option<i64>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Create order payload
///
/// `unit_price` falls back to the material's reference price; `quantity`
/// falls back to the vehicle's default load. Missing numerics coerce to 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub client_id: i64,
    pub material_id: i64,
    pub unit_price: Option<f64>,
    pub quantity: Option<f64>,
    pub vehicle_id: Option<i64>,
    pub closure_id: Option<i64>,
    pub status: Option<OrderStatus>,
}

/// Update order payload
///
/// Per-field override precedence (the named contract):
/// - `unit_price`: explicit value > material reference price (when
///   `material_id` is present in the patch) > existing order value
/// - `quantity`: explicit value > vehicle default load (when `vehicle_id`
///   is present in the patch) > existing order value
///
/// `closure_id` is three-state: absent keeps the current closure, `null`
/// detaches the order, a value attaches it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPatch {
    pub client_id: Option<i64>,
    pub material_id: Option<i64>,
    pub unit_price: Option<f64>,
    pub quantity: Option<f64>,
    pub vehicle_id: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub closure_id: Option<Option<i64>>,
    pub status: Option<OrderStatus>,
}

/// Distinguishes an absent field (outer None) from an explicit `null`
/// (inner None) during deserialization.
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_closure_absent_keeps() {
        let patch: OrderPatch = serde_json::from_str(r#"{"quantity": 5.0}"#).unwrap();
        assert_eq!(patch.closure_id, None);
        assert_eq!(patch.quantity, Some(5.0));
    }

    #[test]
    fn test_patch_closure_null_detaches() {
        let patch: OrderPatch = serde_json::from_str(r#"{"closure_id": null}"#).unwrap();
        assert_eq!(patch.closure_id, Some(None));
    }

    #[test]
    fn test_patch_closure_value_attaches() {
        let patch: OrderPatch = serde_json::from_str(r#"{"closure_id": 7}"#).unwrap();
        assert_eq!(patch.closure_id, Some(Some(7)));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::InClosure).unwrap(),
            "\"IN_CLOSURE\""
        );
        let status: OrderStatus = serde_json::from_str("\"PAID\"").unwrap();
        assert_eq!(status, OrderStatus::Paid);
    }
}
