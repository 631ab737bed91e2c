use shared::models::{User, UserCreate, UserUpdate};
use sqlx::PgPool;

pub async fn list(pool: &PgPool, search: Option<&str>) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM users
         WHERE ($1::text IS NULL
                OR name ILIKE '%' || $1 || '%'
                OR username ILIKE '%' || $1 || '%'
                OR role ILIKE '%' || $1 || '%')
         ORDER BY username",
    )
    .bind(search)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// The password is hashed by the caller before it gets here.
pub async fn create(
    pool: &PgPool,
    data: &UserCreate,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO users (name, username, role, password_hash)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(&data.name)
    .bind(&data.username)
    .bind(&data.role)
    .bind(password_hash)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &UserUpdate,
    password_hash: Option<&str>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE users SET
             name = COALESCE($1, name),
             username = COALESCE($2, username),
             role = COALESCE($3, role),
             password_hash = COALESCE($4, password_hash)
         WHERE id = $5
         RETURNING *",
    )
    .bind(&data.name)
    .bind(&data.username)
    .bind(&data.role)
    .bind(password_hash)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
