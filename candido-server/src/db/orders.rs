//! Order persistence and the closure-consistency engine
//!
//! Every order write that touches closure membership runs in a transaction
//! and leaves the affected closure totals equal to the sum of their member
//! orders. Reassignment recomputes both the old and the new closure.

use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Material, Order, OrderCreate, OrderPatch, OrderStatus, Vehicle};
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{ServiceError, ServiceResult};
use crate::pricing;

use super::closures::recompute_total;

/// Order row joined with the names the listing screens display.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderSummary {
    pub id: i64,
    pub client_id: i64,
    pub client_name: String,
    pub material_id: i64,
    pub material_name: String,
    pub vehicle_id: Option<i64>,
    pub plate: Option<String>,
    pub closure_id: Option<i64>,
    pub unit_price: f64,
    pub quantity: f64,
    pub total_value: f64,
    pub status: OrderStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Listing filters, already normalized by the API layer (date bounds in
/// UTC, plate search split into text match vs. "no plate" match).
#[derive(Debug, Default)]
pub struct OrderFilter {
    pub from: Option<chrono::DateTime<chrono::Utc>>,
    pub to: Option<chrono::DateTime<chrono::Utc>>,
    pub client: Option<String>,
    pub plate: Option<String>,
    /// True when the plate search should also match vehicle-less orders
    pub include_no_plate: bool,
    pub material: Option<String>,
    pub quantity: Option<f64>,
    pub status: Option<OrderStatus>,
}

pub async fn list(pool: &PgPool, filter: &OrderFilter) -> Result<Vec<OrderSummary>, sqlx::Error> {
    sqlx::query_as(
        "SELECT o.id, o.client_id, c.name AS client_name,
                o.material_id, m.name AS material_name,
                o.vehicle_id, v.plate,
                o.closure_id, o.unit_price, o.quantity, o.total_value,
                o.status, o.created_at
         FROM orders o
         JOIN clients c ON c.id = o.client_id
         JOIN materials m ON m.id = o.material_id
         LEFT JOIN vehicles v ON v.id = o.vehicle_id
         WHERE ($1::timestamptz IS NULL OR o.created_at >= $1)
           AND ($2::timestamptz IS NULL OR o.created_at <= $2)
           AND ($3::text IS NULL OR c.name ILIKE '%' || $3 || '%')
           AND ($4::text IS NULL
                OR v.plate ILIKE '%' || $4 || '%'
                OR (o.vehicle_id IS NULL AND $5))
           AND ($6::text IS NULL OR m.name ILIKE '%' || $6 || '%')
           AND ($7::double precision IS NULL OR o.quantity = $7)
           AND ($8::order_status IS NULL OR o.status = $8)
         ORDER BY o.created_at DESC, o.id DESC",
    )
    .bind(filter.from)
    .bind(filter.to)
    .bind(filter.client.as_deref())
    .bind(filter.plate.as_deref())
    .bind(filter.include_no_plate)
    .bind(filter.material.as_deref())
    .bind(filter.quantity)
    .bind(filter.status)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Create an order inside a transaction.
///
/// References are validated up front so a dangling id fails with a 404
/// before anything is persisted. Unit price falls back to the material's
/// reference price, quantity to the vehicle's default load. When the order
/// is born inside a closure its total is folded into the closure before
/// commit.
pub async fn create(pool: &PgPool, data: &OrderCreate) -> ServiceResult<Order> {
    let mut tx = pool.begin().await?;

    require_client(&mut tx, data.client_id).await?;
    let material = require_material(&mut tx, data.material_id).await?;
    let vehicle = match data.vehicle_id {
        Some(vehicle_id) => Some(require_vehicle(&mut tx, vehicle_id).await?),
        None => None,
    };
    if let Some(closure_id) = data.closure_id {
        require_closure(&mut tx, closure_id).await?;
    }

    let unit_price = pricing::resolve_unit_price(data.unit_price, Some(material.price_m3), None);
    let quantity =
        pricing::resolve_quantity(data.quantity, vehicle.map(|v| v.quantity_m3), None);
    let total_value = pricing::total_value(quantity, unit_price);

    // Attachment forces the closure-linked status
    let status = if data.closure_id.is_some() {
        OrderStatus::InClosure
    } else {
        data.status.unwrap_or(OrderStatus::Pending)
    };

    let order: Order = sqlx::query_as(
        "INSERT INTO orders
             (client_id, material_id, unit_price, quantity, total_value,
              vehicle_id, closure_id, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING *",
    )
    .bind(data.client_id)
    .bind(data.material_id)
    .bind(unit_price)
    .bind(quantity)
    .bind(total_value)
    .bind(data.vehicle_id)
    .bind(data.closure_id)
    .bind(status)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(closure_id) = order.closure_id {
        recompute_total(&mut tx, closure_id).await?;
    }

    tx.commit().await?;
    Ok(order)
}

/// Patch an order inside a transaction.
///
/// Value resolution follows the fixed precedence (explicit > referenced
/// entity > stored value) and the total is always rederived. Closure
/// membership is three-state: an absent `closure_id` keeps the current
/// closure, `null` detaches, a value attaches. Both the old and the new
/// closure totals are recomputed before commit.
pub async fn update(pool: &PgPool, id: i64, patch: &OrderPatch) -> ServiceResult<Order> {
    let mut tx = pool.begin().await?;

    let existing: Order = sqlx::query_as("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    if let Some(client_id) = patch.client_id {
        require_client(&mut tx, client_id).await?;
    }
    let material_price = match patch.material_id {
        Some(material_id) => Some(require_material(&mut tx, material_id).await?.price_m3),
        None => None,
    };
    let vehicle_quantity = match patch.vehicle_id {
        Some(vehicle_id) => Some(require_vehicle(&mut tx, vehicle_id).await?.quantity_m3),
        None => None,
    };

    let new_closure_id = match patch.closure_id {
        Some(value) => value,
        None => existing.closure_id,
    };
    if let Some(closure_id) = new_closure_id
        && Some(closure_id) != existing.closure_id
    {
        require_closure(&mut tx, closure_id).await?;
    }

    let unit_price =
        pricing::resolve_unit_price(patch.unit_price, material_price, Some(existing.unit_price));
    let quantity =
        pricing::resolve_quantity(patch.quantity, vehicle_quantity, Some(existing.quantity));
    let total_value = pricing::total_value(quantity, unit_price);

    let status = match patch.status {
        Some(status) => status,
        // Membership changes move the status along when the caller didn't
        // pick one explicitly
        None => match (existing.closure_id, new_closure_id) {
            (old, Some(_)) if old != new_closure_id => OrderStatus::InClosure,
            (Some(_), None) if existing.status == OrderStatus::InClosure => OrderStatus::Pending,
            _ => existing.status,
        },
    };

    let updated: Order = sqlx::query_as(
        "UPDATE orders SET
             client_id = $1, material_id = $2, unit_price = $3, quantity = $4,
             total_value = $5, vehicle_id = $6, closure_id = $7, status = $8
         WHERE id = $9
         RETURNING *",
    )
    .bind(patch.client_id.unwrap_or(existing.client_id))
    .bind(patch.material_id.unwrap_or(existing.material_id))
    .bind(unit_price)
    .bind(quantity)
    .bind(total_value)
    .bind(patch.vehicle_id.or(existing.vehicle_id))
    .bind(new_closure_id)
    .bind(status)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(old_id) = existing.closure_id
        && existing.closure_id != updated.closure_id
    {
        recompute_total(&mut tx, old_id).await?;
    }
    if let Some(new_id) = updated.closure_id {
        recompute_total(&mut tx, new_id).await?;
    }

    tx.commit().await?;
    Ok(updated)
}

/// Delete an order; a member order's value is removed from its closure
/// total in the same transaction.
pub async fn delete(pool: &PgPool, id: i64) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;

    let row: Option<(f64, Option<i64>)> =
        sqlx::query_as("SELECT total_value, closure_id FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let (total_value, closure_id) =
        row.ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    sqlx::query("DELETE FROM orders WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if let Some(closure_id) = closure_id {
        sqlx::query("UPDATE closures SET total = total - $1 WHERE id = $2")
            .bind(total_value)
            .bind(closure_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

async fn require_client(tx: &mut Transaction<'_, Postgres>, id: i64) -> ServiceResult<()> {
    let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM clients WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    exists
        .map(|_| ())
        .ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::ClientNotFound)))
}

async fn require_material(tx: &mut Transaction<'_, Postgres>, id: i64) -> ServiceResult<Material> {
    let material: Option<Material> = sqlx::query_as("SELECT * FROM materials WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    material.ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::MaterialNotFound)))
}

async fn require_vehicle(tx: &mut Transaction<'_, Postgres>, id: i64) -> ServiceResult<Vehicle> {
    let vehicle: Option<Vehicle> = sqlx::query_as("SELECT * FROM vehicles WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    vehicle.ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::VehicleNotFound)))
}

async fn require_closure(tx: &mut Transaction<'_, Postgres>, id: i64) -> ServiceResult<()> {
    let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM closures WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    exists
        .map(|_| ())
        .ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::ClosureNotFound)))
}
