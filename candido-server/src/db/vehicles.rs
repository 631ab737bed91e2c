use shared::error::{AppError, ErrorCode};
use shared::models::{Vehicle, VehicleCreate, VehicleUpdate};
use sqlx::PgPool;

use crate::error::{ServiceError, ServiceResult};

pub async fn list(
    pool: &PgPool,
    client_id: Option<i64>,
    plate: Option<&str>,
    search: Option<&str>,
) -> Result<Vec<Vehicle>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM vehicles
         WHERE ($1::bigint IS NULL OR client_id = $1)
           AND ($2::text IS NULL OR plate ILIKE '%' || $2 || '%')
           AND ($3::text IS NULL OR plate ILIKE '%' || $3 || '%')
         ORDER BY plate",
    )
    .bind(client_id)
    .bind(plate)
    .bind(search)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Vehicle>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM vehicles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Plates are normalized to uppercase on the way in. The owning client
/// must exist; a dangling id is a 404, not a constraint blowup.
pub async fn create(pool: &PgPool, data: &VehicleCreate) -> ServiceResult<Vehicle> {
    require_client(pool, data.client_id).await?;

    let vehicle = sqlx::query_as(
        "INSERT INTO vehicles (client_id, plate, quantity_m3)
         VALUES ($1, UPPER($2), COALESCE($3, 0))
         RETURNING *",
    )
    .bind(data.client_id)
    .bind(data.plate.trim())
    .bind(data.quantity_m3)
    .fetch_one(pool)
    .await?;
    Ok(vehicle)
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &VehicleUpdate,
) -> ServiceResult<Option<Vehicle>> {
    if let Some(client_id) = data.client_id {
        require_client(pool, client_id).await?;
    }

    let vehicle = sqlx::query_as(
        "UPDATE vehicles SET
             plate = COALESCE(UPPER($1), plate),
             quantity_m3 = COALESCE($2, quantity_m3),
             client_id = COALESCE($3, client_id)
         WHERE id = $4
         RETURNING *",
    )
    .bind(data.plate.as_deref().map(str::trim))
    .bind(data.quantity_m3)
    .bind(data.client_id)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(vehicle)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

async fn require_client(pool: &PgPool, id: i64) -> ServiceResult<()> {
    let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM clients WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    exists
        .map(|_| ())
        .ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::ClientNotFound)))
}
