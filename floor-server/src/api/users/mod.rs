//! User API 模块
//!
//! | 路径 | 方法 | 权限 |
//! |------|------|------|
//! | /api/users | GET | manage_users |
//! | /api/users/{id} | GET, PUT | 本人或 manage_users |
//! | /api/users/{id}/password | PUT | 本人或 manage_users |
//! | /api/users/{id}/role | PUT | manage_users |
//! | /api/users/{id} | DELETE | manage_users |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::permissions::MANAGE_USERS;
use crate::auth::{require_permission, require_two_factor};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/users", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    // 本人或管理者，在 handler 内判断
    let account_routes = Router::new()
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/password", put(handler::change_password));

    let manage_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}/role", put(handler::update_role))
        .route("/{id}", axum::routing::delete(handler::delete))
        .layer(middleware::from_fn_with_state(state.clone(), require_two_factor))
        .layer(middleware::from_fn(require_permission(MANAGE_USERS)));

    account_routes.merge(manage_routes)
}
