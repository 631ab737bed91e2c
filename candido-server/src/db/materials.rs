use shared::models::{Material, MaterialCreate, MaterialUpdate};
use sqlx::PgPool;

pub async fn list(pool: &PgPool, search: Option<&str>) -> Result<Vec<Material>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM materials
         WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
         ORDER BY name",
    )
    .bind(search)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Material>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM materials WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, data: &MaterialCreate) -> Result<Material, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO materials (name, price_m3)
         VALUES ($1, COALESCE($2, 0))
         RETURNING *",
    )
    .bind(&data.name)
    .bind(data.price_m3)
    .fetch_one(pool)
    .await
}

/// Partial update: absent fields keep their stored value. Changing the
/// reference price never touches existing orders, which keep the unit
/// price captured at order time.
pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &MaterialUpdate,
) -> Result<Option<Material>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE materials SET
             name = COALESCE($1, name),
             price_m3 = COALESCE($2, price_m3)
         WHERE id = $3
         RETURNING *",
    )
    .bind(&data.name)
    .bind(data.price_m3)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM materials WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
