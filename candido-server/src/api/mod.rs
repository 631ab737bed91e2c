//! API routes for candido-server

pub mod auth;
pub mod client;
pub mod closure;
pub mod health;
pub mod material;
pub mod order;
pub mod user;
pub mod vehicle;

use axum::routing::{get, post};
use axum::{Router, middleware};
use shared::error::{AppError, ErrorCode};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{UserIdentity, auth_middleware};
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

/// Guard for management-only endpoints.
pub fn require_admin(identity: &UserIdentity) -> Result<(), AppError> {
    if identity.role != "ADMIN" {
        return Err(AppError::with_message(
            ErrorCode::RoleRequired,
            "ADMIN role required",
        ));
    }
    Ok(())
}

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Everything under /api except login requires a valid JWT
    let protected = Router::new()
        .route(
            "/clients",
            get(client::list_clients).post(client::create_client),
        )
        .route(
            "/clients/{id}",
            get(client::get_client)
                .put(client::update_client)
                .delete(client::delete_client),
        )
        .route(
            "/materials",
            get(material::list_materials).post(material::create_material),
        )
        .route(
            "/materials/{id}",
            get(material::get_material)
                .put(material::update_material)
                .delete(material::delete_material),
        )
        .route(
            "/vehicles",
            get(vehicle::list_vehicles).post(vehicle::create_vehicle),
        )
        .route(
            "/vehicles/{id}",
            get(vehicle::get_vehicle)
                .put(vehicle::update_vehicle)
                .delete(vehicle::delete_vehicle),
        )
        .route("/orders", get(order::list_orders).post(order::create_order))
        .route("/orders/grouped", get(order::list_orders_grouped))
        .route(
            "/orders/{id}",
            get(order::get_order)
                .put(order::update_order)
                .delete(order::delete_order),
        )
        .route(
            "/closures",
            get(closure::list_closures).post(closure::create_closure),
        )
        .route(
            "/closures/{id}",
            get(closure::get_closure)
                .put(closure::update_closure)
                .delete(closure::delete_closure),
        )
        .route("/closures/{id}/finalize", post(closure::finalize_closure))
        .route("/users", get(user::list_users).post(user::create_user))
        .route(
            "/users/{id}",
            get(user::get_user)
                .put(user::update_user)
                .delete(user::delete_user),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/login", post(auth::login))
        .nest("/api", protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
