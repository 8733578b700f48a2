//! Authentication Handlers
//!
//! Handles registration, login and the current account

use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};
use shared::models::{LoginRequest, LoginResponse, RegisterRequest, Role, UserInfo};

use crate::auth::CurrentUser;
use crate::auth::password::{hash_password, verify_password};
use crate::core::ServerState;
use crate::db::models::NewUser;
use crate::db::repository::{UserRepository, parse_record_id};
use crate::security_log;
use crate::utils::{AppError, AppResult, ErrorCode, validate_payload};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// POST /api/auth/register - 注册自助账号 (角色固定为 USER)
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserInfo>)> {
    validate_payload(&req)?;

    let repo = UserRepository::new(state.get_db());
    let email = req.email.trim().to_lowercase();

    if repo.find_by_email(&email).await?.is_some() {
        return Err(AppError::new(ErrorCode::UserEmailExists));
    }
    if repo.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::new(ErrorCode::UsernameExists));
    }

    let hash_pass = hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))?;

    let user = repo
        .create(NewUser {
            username: req.username,
            email,
            hash_pass,
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
            role: Role::User,
        })
        .await?;

    tracing::info!(user_id = %user.id_string(), username = %user.username, "User registered");

    let permissions = crate::auth::permissions::permissions_for(user.role);
    Ok((StatusCode::CREATED, Json(user.to_info(permissions))))
}

/// POST /api/auth/login - 邮箱 + 密码登录
///
/// 账号不存在、已停用或密码错误统一返回 401
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let repo = UserRepository::new(state.get_db());
    let email = req.email.trim().to_lowercase();
    let user = repo.find_by_email(&email).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent account enumeration
    let user = match user {
        Some(u) if u.is_active => {
            let password_valid = verify_password(&req.password, &u.hash_pass)
                .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;
            if !password_valid {
                security_log!("WARN", "login_failed", email = email.clone(), reason = "invalid_credentials");
                return Err(AppError::invalid_credentials());
            }
            u
        }
        Some(_) => {
            security_log!("WARN", "login_failed", email = email.clone(), reason = "account_disabled");
            return Err(AppError::invalid_credentials());
        }
        None => {
            security_log!("WARN", "login_failed", email = email.clone(), reason = "user_not_found");
            return Err(AppError::invalid_credentials());
        }
    };

    let user_id = user.id_string();
    let token = state
        .get_jwt_service()
        .generate_token(&user_id, &user.username, user.role, user.two_factor_enabled)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(
        user_id = %user_id,
        username = %user.username,
        role = %user.role,
        "User logged in successfully"
    );

    let permissions = crate::auth::permissions::permissions_for(user.role);
    Ok(Json(LoginResponse {
        token,
        user: user.to_info(permissions),
    }))
}

/// GET /api/auth/me - 当前账号
pub async fn me(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<UserInfo>> {
    let id = parse_record_id("user", &current.id)?;
    let user = UserRepository::new(state.get_db())
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    Ok(Json(user.to_info(current.permissions())))
}
