use shared::models::{Client, ClientCreate, ClientKind, ClientUpdate};
use sqlx::PgPool;

/// List clients, optionally filtered by kind and a free-text search over
/// name and tax ids.
pub async fn list(
    pool: &PgPool,
    kind: Option<ClientKind>,
    search: Option<&str>,
) -> Result<Vec<Client>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM clients
         WHERE ($1::client_kind IS NULL OR kind = $1)
           AND ($2::text IS NULL
                OR name ILIKE '%' || $2 || '%'
                OR razao_social ILIKE '%' || $2 || '%'
                OR cpf ILIKE '%' || $2 || '%'
                OR cnpj ILIKE '%' || $2 || '%'
                OR phone ILIKE '%' || $2 || '%'
                OR email ILIKE '%' || $2 || '%')
         ORDER BY name",
    )
    .bind(kind)
    .bind(search)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Client>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM clients WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, data: &ClientCreate) -> Result<Client, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO clients
             (kind, name, cpf, razao_social, cnpj, inscricao_estadual, address, phone, email)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING *",
    )
    .bind(data.kind)
    .bind(&data.name)
    .bind(&data.cpf)
    .bind(&data.razao_social)
    .bind(&data.cnpj)
    .bind(&data.inscricao_estadual)
    .bind(&data.address)
    .bind(&data.phone)
    .bind(&data.email)
    .fetch_one(pool)
    .await
}

/// Partial update: absent fields keep their stored value.
pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &ClientUpdate,
) -> Result<Option<Client>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE clients SET
             kind = COALESCE($1, kind),
             name = COALESCE($2, name),
             cpf = COALESCE($3, cpf),
             razao_social = COALESCE($4, razao_social),
             cnpj = COALESCE($5, cnpj),
             inscricao_estadual = COALESCE($6, inscricao_estadual),
             address = COALESCE($7, address),
             phone = COALESCE($8, phone),
             email = COALESCE($9, email),
             balance = COALESCE($10, balance)
         WHERE id = $11
         RETURNING *",
    )
    .bind(data.kind)
    .bind(&data.name)
    .bind(&data.cpf)
    .bind(&data.razao_social)
    .bind(&data.cnpj)
    .bind(&data.inscricao_estadual)
    .bind(&data.address)
    .bind(&data.phone)
    .bind(&data.email)
    .bind(data.balance)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Returns the number of deleted rows (0 when the client does not exist).
pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM clients WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
