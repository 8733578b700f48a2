//! Role API Module

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::permissions::MANAGE_USERS;
use crate::auth::{require_permission, require_two_factor};
use crate::core::ServerState;

/// Role router - 角色是固定集合，只读
pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/roles", get(handler::list))
        .route("/api/roles/{role}/permissions", get(handler::get_role_permissions))
        .layer(middleware::from_fn_with_state(state.clone(), require_two_factor))
        .layer(middleware::from_fn(require_permission(MANAGE_USERS)))
}
