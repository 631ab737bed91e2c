//! Closure endpoints: billing batches over orders

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Closure, ClosureCreate, ClosureUpdate};

use crate::db;
use crate::db::closures::ClosureDetail;
use crate::error::ServiceError;
use crate::state::AppState;

use super::ApiResult;

#[derive(Deserialize)]
pub struct ClosuresQuery {
    pub search: Option<String>,
}

pub async fn list_closures(
    State(state): State<AppState>,
    Query(query): Query<ClosuresQuery>,
) -> ApiResult<Vec<ClosureDetail>> {
    let closures = db::closures::list(&state.pool, query.search.as_deref())
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(closures))
}

pub async fn get_closure(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<ClosureDetail> {
    let closure = db::closures::find_by_id(&state.pool, id)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::ClosureNotFound))?;
    Ok(Json(closure))
}

pub async fn create_closure(
    State(state): State<AppState>,
    Json(data): Json<ClosureCreate>,
) -> ApiResult<ClosureDetail> {
    let closure = db::closures::create(&state.pool, &data).await?;
    Ok(Json(closure))
}

pub async fn update_closure(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<ClosureUpdate>,
) -> ApiResult<Closure> {
    let closure = db::closures::update(&state.pool, id, &data).await?;
    Ok(Json(closure))
}

/// POST /api/closures/:id/finalize — settle the closure and mark every
/// member order paid. Already-settled closures settle to themselves.
pub async fn finalize_closure(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Closure> {
    let closure = db::closures::finalize(&state.pool, id).await?;
    Ok(Json(closure))
}

pub async fn delete_closure(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    db::closures::delete(&state.pool, id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
