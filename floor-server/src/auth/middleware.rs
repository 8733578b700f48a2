//! 认证中间件
//!
//! 为 JWT 认证和授权提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::ErrorCode;

use crate::AppError;
use crate::auth::CurrentUser;
use crate::auth::extractor::authenticate;
use crate::core::ServerState;
use crate::security_log;

/// 无需登录的 API 路由
const PUBLIC_API_ROUTES: &[&str] = &[
    "/api/auth/login",
    "/api/auth/register",
    "/api/health",
    "/api/reservations/availability",
];

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径
/// - [`PUBLIC_API_ROUTES`]
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 Unauthorized |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 | 401 InvalidToken |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if skips_auth(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let user = authenticate(&state.get_jwt_service(), req.headers(), req.uri())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// CORS 预检、非 API 路径 (交给 404) 以及公共路由不做认证
fn skips_auth(method: &http::Method, path: &str) -> bool {
    *method == http::Method::OPTIONS
        || !path.starts_with("/api/")
        || PUBLIC_API_ROUTES.contains(&path)
}

/// 权限检查中间件 - 要求特定权限
///
/// ```ignore
/// use axum::middleware;
/// Router::new()
///     .route("/", get(handler::list))
///     .layer(middleware::from_fn(require_permission(permissions::VIEW_FLOOR_PLAN)));
/// ```
///
/// 无权限返回 403 Forbidden
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::unauthorized())?;

            if !user.has_permission(permission) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id.clone(),
                    username = user.username.clone(),
                    required_permission = permission
                );
                return Err(AppError::forbidden(format!(
                    "Permission denied: {}",
                    permission
                )));
            }

            Ok(next.run(req).await)
        })
    }
}

/// 双因素认证门禁
///
/// 开启 `REQUIRE_TWO_FACTOR` 时，未开启双因素认证的 ADMIN/OWNER
/// 无法访问被保护的路由。
pub async fn require_two_factor(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.config.require_two_factor {
        return Ok(next.run(req).await);
    }

    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::unauthorized())?;

    if user.role.requires_two_factor() && !user.two_factor_enabled {
        security_log!(
            "WARN",
            "two_factor_required",
            user_id = user.id.clone(),
            role = user.role.as_str()
        );
        return Err(AppError::new(ErrorCode::TwoFactorRequired));
    }

    Ok(next.run(req).await)
}
