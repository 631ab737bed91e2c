//! Client endpoints

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Client, ClientCreate, ClientKind, ClientUpdate};

use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;

use super::ApiResult;

/// GET /api/clients
#[derive(Deserialize)]
pub struct ClientsQuery {
    pub kind: Option<ClientKind>,
    pub search: Option<String>,
}

pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ClientsQuery>,
) -> ApiResult<Vec<Client>> {
    let clients = db::clients::list(&state.pool, query.kind, query.search.as_deref())
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(clients))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Client> {
    let client = db::clients::find_by_id(&state.pool, id)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::ClientNotFound))?;
    Ok(Json(client))
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(data): Json<ClientCreate>,
) -> ApiResult<Client> {
    if data.name.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "name is required",
        ));
    }
    let client = db::clients::create(&state.pool, &data)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(client))
}

pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<ClientUpdate>,
) -> ApiResult<Client> {
    let client = db::clients::update(&state.pool, id, &data)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::ClientNotFound))?;
    Ok(Json(client))
}

pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    let deleted = db::clients::delete(&state.pool, id)
        .await
        .map_err(ServiceError::from)?;
    if deleted == 0 {
        return Err(AppError::new(ErrorCode::ClientNotFound));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
