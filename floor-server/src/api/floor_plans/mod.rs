//! Floor Plan API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post, put},
};

use crate::auth::permissions::{
    CREATE_FLOOR_PLAN, DELETE_FLOOR_PLAN, EDIT_FLOOR_PLAN, VIEW_FLOOR_PLAN,
};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/floor-plans", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission(VIEW_FLOOR_PLAN)));

    let create_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_permission(CREATE_FLOOR_PLAN)));

    let edit_routes = Router::new()
        .route("/{id}", put(handler::update))
        .route("/{id}/status", patch(handler::update_status))
        .route("/{id}/obstacles", put(handler::replace_obstacles))
        .layer(middleware::from_fn(require_permission(EDIT_FLOOR_PLAN)));

    let delete_routes = Router::new()
        .route("/{id}", axum::routing::delete(handler::delete))
        .layer(middleware::from_fn(require_permission(DELETE_FLOOR_PLAN)));

    read_routes
        .merge(create_routes)
        .merge(edit_routes)
        .merge(delete_routes)
}
