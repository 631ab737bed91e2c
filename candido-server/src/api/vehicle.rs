//! Vehicle endpoints

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Vehicle, VehicleCreate, VehicleUpdate};

use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;

use super::ApiResult;

#[derive(Deserialize)]
pub struct VehiclesQuery {
    pub client_id: Option<i64>,
    pub plate: Option<String>,
    pub search: Option<String>,
}

pub async fn list_vehicles(
    State(state): State<AppState>,
    Query(query): Query<VehiclesQuery>,
) -> ApiResult<Vec<Vehicle>> {
    let vehicles = db::vehicles::list(
        &state.pool,
        query.client_id,
        query.plate.as_deref(),
        query.search.as_deref(),
    )
    .await
    .map_err(ServiceError::from)?;
    Ok(Json(vehicles))
}

pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vehicle> {
    let vehicle = db::vehicles::find_by_id(&state.pool, id)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::VehicleNotFound))?;
    Ok(Json(vehicle))
}

pub async fn create_vehicle(
    State(state): State<AppState>,
    Json(data): Json<VehicleCreate>,
) -> ApiResult<Vehicle> {
    if data.plate.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "plate is required",
        ));
    }
    let vehicle = db::vehicles::create(&state.pool, &data).await?;
    Ok(Json(vehicle))
}

pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<VehicleUpdate>,
) -> ApiResult<Vehicle> {
    let vehicle = db::vehicles::update(&state.pool, id, &data)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::VehicleNotFound))?;
    Ok(Json(vehicle))
}

pub async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    let deleted = db::vehicles::delete(&state.pool, id)
        .await
        .map_err(ServiceError::from)?;
    if deleted == 0 {
        return Err(AppError::new(ErrorCode::VehicleNotFound));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
