use std::time::{Duration, Instant};

use axum::{Router, middleware};
use http::HeaderValue;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = started.elapsed().as_millis() as u64;

    tracing::info!(target: "http_access", latency_ms, "{} {} {}", method, uri, status);

    response
}

/// Request ID generator (snowflake)
#[derive(Clone, Copy)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = shared::util::snowflake_id();
        Some(RequestId::new(HeaderValue::from(id)))
    }
}

#[allow(deprecated)]
fn timeout_layer(timeout_ms: u64) -> TimeoutLayer {
    TimeoutLayer::new(Duration::from_millis(timeout_ms))
}

/// Build the Axum router (state not yet attached)
///
/// `state` is only needed by layers built with `from_fn_with_state`.
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::auth::router())
        .merge(crate::api::users::router(state))
        .merge(crate::api::role::router(state))
        .merge(crate::api::floor_plans::router())
        .merge(crate::api::tables::router())
        .merge(crate::api::reservations::router())
}

/// Build the fully configured router with state and middleware
///
/// Used by [`crate::core::Server`] and by router tests (`oneshot`).
pub fn build_router(state: ServerState) -> Router {
    let timeout_ms = state.config.request_timeout_ms;

    build_app(&state)
        // JWT 认证中间件 - require_auth 内部会跳过公共路由
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(timeout_layer(timeout_ms))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(XRequestId))
}
