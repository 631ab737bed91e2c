//! Authentication endpoint: login

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::User;

use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::util::verify_password;

use super::ApiResult;

/// POST /api/login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Long-lived session (30 days instead of 1 hour)
    #[serde(default)]
    pub remember: bool,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let username = req.username.trim();

    // Unknown user and wrong password are indistinguishable to the caller
    let user = db::users::find_by_username(&state.pool, username)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::InvalidCredentials))?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(AppError::new(ErrorCode::InvalidCredentials));
    }

    let token =
        crate::auth::create_token(&user, &state.jwt_secret, req.remember).map_err(|e| {
            tracing::error!("JWT creation failed: {e}");
            AppError::new(ErrorCode::InternalError)
        })?;

    Ok(Json(LoginResponse { token, user }))
}
