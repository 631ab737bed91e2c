//! Order endpoints: filtered listing, grouped trip report, CRUD

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{Order, OrderCreate, OrderPatch, OrderStatus};

use crate::db;
use crate::db::orders::{OrderFilter, OrderSummary};
use crate::error::ServiceError;
use crate::state::AppState;

use super::ApiResult;

/// The business operates in UTC-4; date filters mean calendar days there.
const BUSINESS_UTC_OFFSET_HOURS: i32 = -4;

/// GET /api/orders
#[derive(Deserialize)]
pub struct OrdersQuery {
    /// Inclusive start date (YYYY-MM-DD, business timezone)
    pub from: Option<NaiveDate>,
    /// Inclusive end date (YYYY-MM-DD, business timezone)
    pub to: Option<NaiveDate>,
    pub client: Option<String>,
    pub plate: Option<String>,
    pub material: Option<String>,
    pub quantity: Option<f64>,
    pub status: Option<OrderStatus>,
}

impl OrdersQuery {
    fn into_filter(self) -> Result<OrderFilter, AppError> {
        let from = self.from.map(day_start).transpose()?;
        let to = self.to.map(day_end).transpose()?;

        // Searching for "sem placa" also matches orders with no vehicle
        let include_no_plate = self
            .plate
            .as_deref()
            .map(|p| {
                let p = p.trim().to_lowercase();
                !p.is_empty() && "sem placa".contains(p.as_str())
            })
            .unwrap_or(false);

        Ok(OrderFilter {
            from,
            to,
            client: self.client,
            plate: self.plate,
            include_no_plate,
            material: self.material,
            quantity: self.quantity,
            status: self.status,
        })
    }
}

fn business_offset() -> Result<FixedOffset, AppError> {
    FixedOffset::east_opt(BUSINESS_UTC_OFFSET_HOURS * 3600)
        .ok_or_else(|| AppError::new(ErrorCode::InternalError))
}

fn day_start(date: NaiveDate) -> Result<DateTime<Utc>, AppError> {
    let offset = business_offset()?;
    date.and_hms_opt(0, 0, 0)
        .and_then(|dt| dt.and_local_timezone(offset).single())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| AppError::with_message(ErrorCode::ValidationFailed, "invalid date"))
}

fn day_end(date: NaiveDate) -> Result<DateTime<Utc>, AppError> {
    let offset = business_offset()?;
    date.and_hms_micro_opt(23, 59, 59, 999_999)
        .and_then(|dt| dt.and_local_timezone(offset).single())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| AppError::with_message(ErrorCode::ValidationFailed, "invalid date"))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> ApiResult<Vec<OrderSummary>> {
    let filter = query.into_filter()?;
    let orders = db::orders::list(&state.pool, &filter)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(orders))
}

pub async fn get_order(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Order> {
    let order = db::orders::find_by_id(&state.pool, id)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    Ok(Json(order))
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(data): Json<OrderCreate>,
) -> ApiResult<Order> {
    let order = db::orders::create(&state.pool, &data).await?;
    Ok(Json(order))
}

pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<OrderPatch>,
) -> ApiResult<Order> {
    let order = db::orders::update(&state.pool, id, &patch).await?;
    Ok(Json(order))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    db::orders::delete(&state.pool, id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

// ── Grouped trip report ──

/// One repeated delivery pattern: same plate, material, quantity and unit
/// price, counted as trips.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TripGroup {
    pub plate: String,
    pub material_id: i64,
    pub material_name: String,
    pub unit_price: f64,
    pub quantity: f64,
    pub trips: i64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClientOrderGroup {
    pub client_id: i64,
    pub client_name: String,
    pub total: f64,
    pub details: Vec<TripGroup>,
}

/// GET /api/orders/grouped — same filters as the flat listing
pub async fn list_orders_grouped(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> ApiResult<Vec<ClientOrderGroup>> {
    let filter = query.into_filter()?;
    let orders = db::orders::list(&state.pool, &filter)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(group_by_trip(orders)))
}

/// Collapse order rows into per-client trip groups. Orders collapse into
/// one group when plate, material, quantity and unit price all match;
/// vehicle-less orders group under "SEM PLACA".
fn group_by_trip(orders: Vec<OrderSummary>) -> Vec<ClientOrderGroup> {
    use std::collections::HashMap;

    let mut clients: HashMap<i64, ClientOrderGroup> = HashMap::new();
    let mut group_index: HashMap<(i64, String), usize> = HashMap::new();

    for order in orders {
        let plate = order.plate.clone().unwrap_or_else(|| "SEM PLACA".into());
        let key = (
            order.client_id,
            format!(
                "{plate}-{}-{}-{}",
                order.material_id, order.quantity, order.unit_price
            ),
        );

        let client = clients
            .entry(order.client_id)
            .or_insert_with(|| ClientOrderGroup {
                client_id: order.client_id,
                client_name: order.client_name.clone(),
                total: 0.0,
                details: Vec::new(),
            });
        client.total += order.total_value;

        match group_index.get(&key) {
            Some(&idx) => {
                let group = &mut client.details[idx];
                group.trips += 1;
                group.total += order.total_value;
            }
            None => {
                group_index.insert(key, client.details.len());
                client.details.push(TripGroup {
                    plate,
                    material_id: order.material_id,
                    material_name: order.material_name.clone(),
                    unit_price: order.unit_price,
                    quantity: order.quantity,
                    trips: 1,
                    total: order.total_value,
                });
            }
        }
    }

    let mut groups: Vec<ClientOrderGroup> = clients.into_values().collect();
    groups.sort_by(|a, b| a.client_id.cmp(&b.client_id));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn summary(
        client_id: i64,
        material_id: i64,
        plate: Option<&str>,
        quantity: f64,
        unit_price: f64,
    ) -> OrderSummary {
        OrderSummary {
            id: 0,
            client_id,
            client_name: format!("client-{client_id}"),
            material_id,
            material_name: format!("material-{material_id}"),
            vehicle_id: plate.map(|_| 1),
            plate: plate.map(Into::into),
            closure_id: None,
            unit_price,
            quantity,
            total_value: quantity * unit_price,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_identical_trips_collapse() {
        let rows = vec![
            summary(1, 10, Some("ABC1234"), 6.0, 85.0),
            summary(1, 10, Some("ABC1234"), 6.0, 85.0),
            summary(1, 10, Some("ABC1234"), 6.0, 85.0),
        ];
        let groups = group_by_trip(rows);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].details.len(), 1);
        assert_eq!(groups[0].details[0].trips, 3);
        assert_eq!(groups[0].details[0].total, 3.0 * 6.0 * 85.0);
        assert_eq!(groups[0].total, 3.0 * 6.0 * 85.0);
    }

    #[test]
    fn test_price_change_splits_group() {
        let rows = vec![
            summary(1, 10, Some("ABC1234"), 6.0, 85.0),
            summary(1, 10, Some("ABC1234"), 6.0, 90.0),
        ];
        let groups = group_by_trip(rows);
        assert_eq!(groups[0].details.len(), 2);
    }

    #[test]
    fn test_vehicle_less_orders_group_under_sem_placa() {
        let rows = vec![
            summary(1, 10, None, 6.0, 85.0),
            summary(1, 10, None, 6.0, 85.0),
        ];
        let groups = group_by_trip(rows);
        assert_eq!(groups[0].details.len(), 1);
        assert_eq!(groups[0].details[0].plate, "SEM PLACA");
        assert_eq!(groups[0].details[0].trips, 2);
    }

    #[test]
    fn test_clients_sorted_and_separated() {
        let rows = vec![
            summary(2, 10, Some("XYZ9876"), 4.0, 70.0),
            summary(1, 10, Some("ABC1234"), 6.0, 85.0),
        ];
        let groups = group_by_trip(rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].client_id, 1);
        assert_eq!(groups[1].client_id, 2);
    }

    #[test]
    fn test_day_bounds_use_business_offset() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let start = day_start(date).unwrap();
        // Midnight at UTC-4 is 04:00 UTC
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 10, 4, 0, 0).unwrap());
        let end = day_end(date).unwrap();
        assert!(end > start);
        assert_eq!(end.date_naive(), NaiveDate::from_ymd_opt(2026, 3, 11).unwrap());
    }

    #[test]
    fn test_sem_placa_search_flag() {
        let q = |plate: Option<&str>| OrdersQuery {
            from: None,
            to: None,
            client: None,
            plate: plate.map(Into::into),
            material: None,
            quantity: None,
            status: None,
        };
        assert!(q(Some("sem")).into_filter().unwrap().include_no_plate);
        assert!(q(Some("SEM PLACA")).into_filter().unwrap().include_no_plate);
        assert!(!q(Some("ABC")).into_filter().unwrap().include_no_plate);
        assert!(!q(None).into_filter().unwrap().include_no_plate);
    }
}
