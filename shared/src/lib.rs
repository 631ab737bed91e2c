//! Shared types for the Cândido delivery backend
//!
//! Domain models, typed request payloads, and the unified error system
//! used by the server crate.

pub mod error;
pub mod models;

// Re-exports
pub use error::{AppError, AppResult, ErrorCode};
pub use serde::{Deserialize, Serialize};
