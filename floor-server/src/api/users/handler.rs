//! User API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{PasswordChange, Role, RoleUpdate, UserUpdate};
use surrealdb::RecordId;

use crate::auth::CurrentUser;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::permissions::MANAGE_USERS;
use crate::core::ServerState;
use crate::db::models::User;
use crate::db::repository::{RepoError, UserRepository, parse_record_id};
use crate::security_log;
use crate::utils::{AppError, AppResult, EmptyResult, ErrorCode, validate_payload};

const TABLE: &str = "user";

fn user_id(id: &str) -> AppResult<RecordId> {
    Ok(parse_record_id(TABLE, id)?)
}

async fn load(repo: &UserRepository, id: &RecordId) -> AppResult<User> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))
}

/// 非 ADMIN 不能操作 ADMIN 账号
fn guard_admin_target(actor: &CurrentUser, target: &User) -> AppResult<()> {
    if target.role == Role::Admin && !actor.is_admin() {
        return Err(AppError::new(ErrorCode::CannotModifyAdmin));
    }
    Ok(())
}

fn map_duplicate(err: RepoError) -> AppError {
    match err {
        RepoError::Duplicate(msg) if msg.starts_with("Email") => {
            AppError::with_message(ErrorCode::UserEmailExists, msg)
        }
        RepoError::Duplicate(msg) if msg.starts_with("Username") => {
            AppError::with_message(ErrorCode::UsernameExists, msg)
        }
        other => other.into(),
    }
}

/// GET /api/users - 获取所有用户 (最新优先)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<User>>> {
    let users = UserRepository::new(state.get_db()).find_all().await?;
    Ok(Json(users))
}

/// GET /api/users/{id} - 获取单个用户 (本人或 manage_users)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<User>> {
    let uid = user_id(&id)?;
    if current.id != uid.to_string() && !current.has_permission(MANAGE_USERS) {
        return Err(AppError::forbidden("You can only view your own account"));
    }

    let user = load(&UserRepository::new(state.get_db()), &uid).await?;
    Ok(Json(user))
}

/// PUT /api/users/{id} - 修改资料
///
/// 本人只能改基础资料；email 与 is_active 仅 manage_users 生效
pub async fn update(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(mut payload): Json<UserUpdate>,
) -> AppResult<Json<User>> {
    validate_payload(&payload)?;
    let uid = user_id(&id)?;
    let is_self = current.id == uid.to_string();
    let can_manage = current.has_permission(MANAGE_USERS);

    if !is_self && !can_manage {
        return Err(AppError::forbidden("You are not allowed to modify this user"));
    }

    let repo = UserRepository::new(state.get_db());
    let target = load(&repo, &uid).await?;
    if !is_self {
        guard_admin_target(&current, &target)?;
    }

    if !can_manage {
        payload.email = None;
        payload.is_active = None;
    }
    if is_self && payload.is_active == Some(false) {
        return Err(AppError::new(ErrorCode::CannotModifySelf));
    }

    let user = repo.update(&uid, payload).await.map_err(map_duplicate)?;
    tracing::info!(user_id = %uid, actor = %current.id, "User updated");
    Ok(Json(user))
}

/// PUT /api/users/{id}/role - 修改角色
///
/// 只有 ADMIN 可以授予 ADMIN；不能修改自己的角色
pub async fn update_role(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<RoleUpdate>,
) -> AppResult<Json<User>> {
    let uid = user_id(&id)?;
    if current.id == uid.to_string() {
        return Err(AppError::new(ErrorCode::CannotModifySelf));
    }
    if payload.role == Role::Admin && !current.is_admin() {
        return Err(AppError::with_message(
            ErrorCode::AdminRequired,
            "Only an ADMIN can grant the ADMIN role",
        ));
    }

    let repo = UserRepository::new(state.get_db());
    let target = load(&repo, &uid).await?;
    guard_admin_target(&current, &target)?;

    let user = repo.update_role(&uid, payload.role).await?;
    security_log!(
        "INFO",
        "role_changed",
        user_id = uid.to_string(),
        from = target.role.as_str(),
        to = payload.role.as_str(),
        actor = current.id.clone()
    );
    Ok(Json(user))
}

/// PUT /api/users/{id}/password - 修改密码
///
/// 本人须提供当前密码；manage_users 可直接重置他人密码
pub async fn change_password(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<PasswordChange>,
) -> EmptyResult {
    validate_payload(&payload)?;
    let uid = user_id(&id)?;
    let is_self = current.id == uid.to_string();

    if !is_self && !current.has_permission(MANAGE_USERS) {
        return Err(AppError::forbidden("You are not allowed to change this password"));
    }

    let repo = UserRepository::new(state.get_db());
    let target = load(&repo, &uid).await?;

    if is_self {
        let current_password = payload
            .current_password
            .as_deref()
            .ok_or_else(|| AppError::validation("current_password: required"))?;
        let valid = verify_password(current_password, &target.hash_pass)
            .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::validation("current_password: incorrect"));
        }
    } else {
        guard_admin_target(&current, &target)?;
    }

    let hash_pass = hash_password(&payload.new_password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))?;
    repo.update_password(&uid, hash_pass).await?;

    security_log!(
        "INFO",
        "password_changed",
        user_id = uid.to_string(),
        actor = current.id.clone()
    );
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/users/{id} - 删除用户
///
/// 不能删除自己；只有 ADMIN 可以删除 ADMIN
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> EmptyResult {
    let uid = user_id(&id)?;
    if current.id == uid.to_string() {
        return Err(AppError::new(ErrorCode::CannotModifySelf));
    }

    let repo = UserRepository::new(state.get_db());
    let target = load(&repo, &uid).await?;
    if target.role == Role::Admin && !current.is_admin() {
        return Err(AppError::new(ErrorCode::CannotDeleteAdmin));
    }

    repo.delete(&uid).await?;
    security_log!(
        "INFO",
        "user_deleted",
        user_id = uid.to_string(),
        actor = current.id.clone()
    );
    Ok(StatusCode::NO_CONTENT)
}
