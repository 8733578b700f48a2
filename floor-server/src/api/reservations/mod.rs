//! Reservation API 模块
//!
//! | 路径 | 方法 | 权限 |
//! |------|------|------|
//! | /api/reservations | GET | view_reservations |
//! | /api/reservations | POST | create_reservation |
//! | /api/reservations/availability | GET | 公共 |
//! | /api/reservations/user/{user_id} | GET | 本人或 view_reservations |
//! | /api/reservations/{id} | GET, PUT | 本人或 edit_reservation |
//! | /api/reservations/{id}/cancel | POST | 本人或 cancel_reservation |
//! | /api/reservations/{id}/confirm | POST | edit_reservation |
//! | /api/reservations/{id}/complete | POST | edit_reservation |
//! | /api/reservations/{id}/no-show | POST | edit_reservation |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::permissions::{CREATE_RESERVATION, VIEW_RESERVATIONS};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reservations", routes())
}

fn routes() -> Router<ServerState> {
    let list_routes = Router::new()
        .route("/", get(handler::list))
        .layer(middleware::from_fn(require_permission(VIEW_RESERVATIONS)));

    let create_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_permission(CREATE_RESERVATION)));

    // 其余路由的授权由预订引擎按预订归属判断
    let reservation_routes = Router::new()
        .route("/availability", get(handler::availability))
        .route("/user/{user_id}", get(handler::list_for_user))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/confirm", post(handler::confirm))
        .route("/{id}/complete", post(handler::complete))
        .route("/{id}/no-show", post(handler::no_show));

    list_routes.merge(create_routes).merge(reservation_routes)
}
