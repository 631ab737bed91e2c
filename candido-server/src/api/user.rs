//! User management endpoints (ADMIN only)

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{User, UserCreate, UserUpdate};

use crate::auth::UserIdentity;
use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::util::hash_password;

use super::{ApiResult, require_admin};

#[derive(Deserialize)]
pub struct UsersQuery {
    pub search: Option<String>,
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Query(query): Query<UsersQuery>,
) -> ApiResult<Vec<User>> {
    require_admin(&identity)?;
    let users = db::users::list(&state.pool, query.search.as_deref())
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<User> {
    require_admin(&identity)?;
    let user = db::users::find_by_id(&state.pool, id)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(Json(user))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(data): Json<UserCreate>,
) -> ApiResult<User> {
    require_admin(&identity)?;
    if data.username.trim().is_empty() || data.password.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "username and password are required",
        ));
    }

    let password_hash = hash_password(&data.password).map_err(|e| {
        tracing::error!("Password hashing failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    let user = db::users::create(&state.pool, &data, &password_hash)
        .await
        .map_err(|e| match ServiceError::from(e) {
            ServiceError::App(app) if app.code == ErrorCode::AlreadyExists => {
                AppError::new(ErrorCode::UsernameExists)
            }
            other => other.into(),
        })?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
    Json(data): Json<UserUpdate>,
) -> ApiResult<User> {
    require_admin(&identity)?;

    let password_hash = match &data.password {
        Some(password) => Some(hash_password(password).map_err(|e| {
            tracing::error!("Password hashing failed: {e}");
            AppError::new(ErrorCode::InternalError)
        })?),
        None => None,
    };

    let user = db::users::update(&state.pool, id, &data, password_hash.as_deref())
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    require_admin(&identity)?;

    // No self-deletion: the last admin locking themselves out is worse
    // than rejecting the request
    if identity.user_id == id {
        return Err(AppError::with_message(
            ErrorCode::InvalidRequest,
            "Cannot delete the authenticated user",
        ));
    }

    let deleted = db::users::delete(&state.pool, id)
        .await
        .map_err(ServiceError::from)?;
    if deleted == 0 {
        return Err(AppError::new(ErrorCode::UserNotFound));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
