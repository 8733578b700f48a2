//! Role API Handlers

use axum::Json;
use axum::extract::Path;
use shared::models::{Role, RolePermissions};

use crate::auth::permissions::permissions_for;
use crate::utils::{AppError, AppResult};

/// GET /api/roles - 全部角色及其权限
pub async fn list() -> Json<Vec<RolePermissions>> {
    let roles = Role::ALL
        .iter()
        .map(|&role| RolePermissions {
            role,
            permissions: permissions_for(role),
        })
        .collect();
    Json(roles)
}

/// GET /api/roles/{role}/permissions - 单个角色的权限
pub async fn get_role_permissions(Path(role): Path<String>) -> AppResult<Json<RolePermissions>> {
    let role: Role = role
        .parse()
        .map_err(|e: shared::models::UnknownRole| AppError::validation(e.to_string()))?;
    Ok(Json(RolePermissions {
        role,
        permissions: permissions_for(role),
    }))
}
