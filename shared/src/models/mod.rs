//! Domain models and request payloads
//!
//! Each entity follows the same pattern as the rest of the workspace:
//! a full entity struct, a `*Create` payload, and a `*Update`/`*Patch`
//! payload with optional fields (absent field = keep current value).

pub mod client;
pub mod closure;
pub mod material;
pub mod order;
pub mod user;
pub mod vehicle;

pub use client::{Client, ClientCreate, ClientKind, ClientUpdate};
pub use closure::{Closure, ClosureCreate, ClosureStatus, ClosureUpdate};
pub use material::{Material, MaterialCreate, MaterialUpdate};
pub use order::{Order, OrderCreate, OrderPatch, OrderStatus};
pub use user::{User, UserCreate, UserUpdate};
pub use vehicle::{Vehicle, VehicleCreate, VehicleUpdate};
