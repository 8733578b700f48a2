//! Dining Table API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post, put},
};

use crate::auth::permissions::{EDIT_FLOOR_PLAN, EDIT_RESERVATION, MOVE_TABLES, VIEW_FLOOR_PLAN};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission(VIEW_FLOOR_PLAN)));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/batch", post(handler::create_batch))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .layer(middleware::from_fn(require_permission(EDIT_FLOOR_PLAN)));

    let move_routes = Router::new()
        .route("/{id}/position", patch(handler::update_position))
        .layer(middleware::from_fn(require_permission(MOVE_TABLES)));

    let status_routes = Router::new()
        .route("/{id}/status", patch(handler::update_status))
        .layer(middleware::from_fn(require_permission(EDIT_RESERVATION)));

    read_routes
        .merge(manage_routes)
        .merge(move_routes)
        .merge(status_routes)
}
