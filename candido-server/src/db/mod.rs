//! Database access layer
//!
//! Plain functions over `PgPool`. Simple CRUD modules return `sqlx::Error`;
//! the order/closure engine modules return `ServiceError` because business
//! rules (missing references, settled closures) surface mid-transaction.

pub mod clients;
pub mod closures;
pub mod materials;
pub mod orders;
pub mod users;
pub mod vehicles;
