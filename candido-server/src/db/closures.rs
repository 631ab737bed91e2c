//! Closure persistence: billing batches over orders
//!
//! A closure's stored `total` is derived state. Everything that can change
//! it runs in a transaction and ends with the total equal to the sum of the
//! member orders' `total_value`.

use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Closure, ClosureCreate, ClosureStatus, ClosureUpdate, Order};
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{ServiceError, ServiceResult};

/// Closure joined with the client name and its member orders, as the
/// billing screens consume it.
#[derive(Debug, Clone, Serialize)]
pub struct ClosureDetail {
    #[serde(flatten)]
    pub closure: Closure,
    pub client_name: String,
    pub orders: Vec<Order>,
}

#[derive(sqlx::FromRow)]
struct ClosureRow {
    id: i64,
    client_id: i64,
    description: Option<String>,
    total: f64,
    status: ClosureStatus,
    created_at: chrono::DateTime<chrono::Utc>,
    client_name: String,
}

impl ClosureRow {
    fn into_detail(self, orders: Vec<Order>) -> ClosureDetail {
        ClosureDetail {
            closure: Closure {
                id: self.id,
                client_id: self.client_id,
                description: self.description,
                total: self.total,
                status: self.status,
                created_at: self.created_at,
            },
            client_name: self.client_name,
            orders,
        }
    }
}

/// Resum a closure's total from its member orders. An empty closure sums
/// to 0.
pub(crate) async fn recompute_total(
    tx: &mut Transaction<'_, Postgres>,
    closure_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE closures
         SET total = COALESCE((SELECT SUM(total_value) FROM orders WHERE closure_id = $1), 0)
         WHERE id = $1",
    )
    .bind(closure_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// List closures with their member orders, optionally filtered by client
/// name or description.
pub async fn list(pool: &PgPool, search: Option<&str>) -> Result<Vec<ClosureDetail>, sqlx::Error> {
    let rows: Vec<ClosureRow> = sqlx::query_as(
        "SELECT f.*, c.name AS client_name
         FROM closures f
         JOIN clients c ON c.id = f.client_id
         WHERE ($1::text IS NULL
                OR c.name ILIKE '%' || $1 || '%'
                OR f.description ILIKE '%' || $1 || '%')
         ORDER BY f.created_at DESC, f.id DESC",
    )
    .bind(search)
    .fetch_all(pool)
    .await?;

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let orders: Vec<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE closure_id = ANY($1) ORDER BY created_at")
            .bind(&ids)
            .fetch_all(pool)
            .await?;

    let mut by_closure: std::collections::HashMap<i64, Vec<Order>> = std::collections::HashMap::new();
    for order in orders {
        if let Some(closure_id) = order.closure_id {
            by_closure.entry(closure_id).or_default().push(order);
        }
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let members = by_closure.remove(&row.id).unwrap_or_default();
            row.into_detail(members)
        })
        .collect())
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<ClosureDetail>, sqlx::Error> {
    let row: Option<ClosureRow> = sqlx::query_as(
        "SELECT f.*, c.name AS client_name
         FROM closures f
         JOIN clients c ON c.id = f.client_id
         WHERE f.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let orders: Vec<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE closure_id = $1 ORDER BY created_at")
            .bind(id)
            .fetch_all(pool)
            .await?;

    Ok(Some(row.into_detail(orders)))
}

/// Create a closure from a batch of existing orders.
///
/// The orders are attached and moved to IN_CLOSURE, and the new closure's
/// total is the sum of their values. Fails with no writes when none of the
/// requested order ids exist. Orders pulled out of another closure leave
/// that closure's total recomputed.
pub async fn create(pool: &PgPool, data: &ClosureCreate) -> ServiceResult<ClosureDetail> {
    let mut tx = pool.begin().await?;

    let client_name: Option<(String,)> = sqlx::query_as("SELECT name FROM clients WHERE id = $1")
        .bind(data.client_id)
        .fetch_optional(&mut *tx)
        .await?;
    let (client_name,) =
        client_name.ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::ClientNotFound)))?;

    let members: Vec<(i64, f64, Option<i64>)> = sqlx::query_as(
        "SELECT id, total_value, closure_id FROM orders WHERE id = ANY($1) FOR UPDATE",
    )
    .bind(&data.order_ids)
    .fetch_all(&mut *tx)
    .await?;

    if members.is_empty() {
        return Err(ServiceError::App(AppError::with_message(
            ErrorCode::ClosureEmpty,
            "No matching orders to close",
        )));
    }

    let total: f64 = members.iter().map(|(_, value, _)| value).sum();

    let closure: Closure = sqlx::query_as(
        "INSERT INTO closures (client_id, description, total)
         VALUES ($1, $2, $3)
         RETURNING *",
    )
    .bind(data.client_id)
    .bind(&data.description)
    .bind(total)
    .fetch_one(&mut *tx)
    .await?;

    let member_ids: Vec<i64> = members.iter().map(|(id, _, _)| *id).collect();
    // PAID members keep their status; everything else becomes IN_CLOSURE
    sqlx::query(
        "UPDATE orders
         SET closure_id = $1,
             status = CASE WHEN status = 'PAID' THEN status ELSE 'IN_CLOSURE'::order_status END
         WHERE id = ANY($2)",
    )
    .bind(closure.id)
    .bind(&member_ids)
    .execute(&mut *tx)
    .await?;

    // Orders stolen from other closures leave those totals stale
    let mut previous: Vec<i64> = members.iter().filter_map(|(_, _, c)| *c).collect();
    previous.sort_unstable();
    previous.dedup();
    for closure_id in previous {
        recompute_total(&mut tx, closure_id).await?;
    }

    let orders: Vec<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE closure_id = $1 ORDER BY created_at")
            .bind(closure.id)
            .fetch_all(&mut *tx)
            .await?;

    tx.commit().await?;

    Ok(ClosureDetail {
        closure,
        client_name,
        orders,
    })
}

/// Patch description/status. A settled closure cannot be reopened; moving
/// an open closure to SETTLED settles it the same way finalize does.
pub async fn update(pool: &PgPool, id: i64, data: &ClosureUpdate) -> ServiceResult<Closure> {
    let mut tx = pool.begin().await?;

    let existing: Option<Closure> =
        sqlx::query_as("SELECT * FROM closures WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let existing =
        existing.ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::ClosureNotFound)))?;

    if data.status == Some(ClosureStatus::Open) && existing.status == ClosureStatus::Settled {
        return Err(ServiceError::App(AppError::with_message(
            ErrorCode::ClosureSettled,
            "A settled closure cannot be reopened",
        )));
    }

    let closure: Closure = sqlx::query_as(
        "UPDATE closures SET
             description = COALESCE($1, description),
             status = COALESCE($2, status)
         WHERE id = $3
         RETURNING *",
    )
    .bind(&data.description)
    .bind(data.status)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    if existing.status == ClosureStatus::Open && closure.status == ClosureStatus::Settled {
        settle_members(&mut tx, id).await?;
    }

    tx.commit().await?;
    Ok(closure)
}

/// Settle a closure: the closure and all member orders become paid.
/// Settling an already-settled closure is a no-op.
pub async fn finalize(pool: &PgPool, id: i64) -> ServiceResult<Closure> {
    let mut tx = pool.begin().await?;

    let closure: Option<Closure> =
        sqlx::query_as("UPDATE closures SET status = 'SETTLED' WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let closure =
        closure.ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::ClosureNotFound)))?;

    settle_members(&mut tx, id).await?;

    tx.commit().await?;
    Ok(closure)
}

/// Delete a closure. Member orders survive: they are detached, and orders
/// still IN_CLOSURE fall back to PENDING while PAID ones stay paid.
pub async fn delete(pool: &PgPool, id: i64) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;

    let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM closures WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    exists.ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::ClosureNotFound)))?;

    sqlx::query(
        "UPDATE orders
         SET closure_id = NULL,
             status = CASE WHEN status = 'IN_CLOSURE' THEN 'PENDING'::order_status ELSE status END
         WHERE closure_id = $1",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM closures WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

async fn settle_members(tx: &mut Transaction<'_, Postgres>, closure_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET status = 'PAID' WHERE closure_id = $1")
        .bind(closure_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
