//! User Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backend user account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    /// Free-form role string checked by the auth middleware (e.g. "ADMIN")
    pub role: String,
    /// Argon2 hash, never serialized in API responses
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Create user payload (password is hashed before storage)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub username: String,
    pub role: String,
    pub password: String,
}

/// Update user payload (absent field = keep current value)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
}
