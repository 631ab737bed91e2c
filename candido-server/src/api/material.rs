//! Material endpoints

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Material, MaterialCreate, MaterialUpdate};

use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;

use super::ApiResult;

#[derive(Deserialize)]
pub struct MaterialsQuery {
    pub search: Option<String>,
}

pub async fn list_materials(
    State(state): State<AppState>,
    Query(query): Query<MaterialsQuery>,
) -> ApiResult<Vec<Material>> {
    let materials = db::materials::list(&state.pool, query.search.as_deref())
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(materials))
}

pub async fn get_material(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Material> {
    let material = db::materials::find_by_id(&state.pool, id)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::MaterialNotFound))?;
    Ok(Json(material))
}

pub async fn create_material(
    State(state): State<AppState>,
    Json(data): Json<MaterialCreate>,
) -> ApiResult<Material> {
    if data.name.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "name is required",
        ));
    }
    let material = db::materials::create(&state.pool, &data)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(material))
}

pub async fn update_material(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<MaterialUpdate>,
) -> ApiResult<Material> {
    let material = db::materials::update(&state.pool, id, &data)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::MaterialNotFound))?;
    Ok(Json(material))
}

pub async fn delete_material(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    let deleted = db::materials::delete(&state.pool, id)
        .await
        .map_err(ServiceError::from)?;
    if deleted == 0 {
        return Err(AppError::new(ErrorCode::MaterialNotFound));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
