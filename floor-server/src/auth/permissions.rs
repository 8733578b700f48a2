//! Permission Definitions
//!
//! 角色 → 权限表在进程启动时构建一次，之后只读。
//!
//! ## 设计原则
//! - ADMIN 拥有全部权限
//! - 预订相关权限按操作拆分 (查看/创建/编辑/取消)
//! - 平面图与桌台按 查看/创建/编辑/删除/移动 拆分
//! - 用户管理仅 ADMIN 与 OWNER

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use shared::models::Role;

pub const VIEW_RESERVATIONS: &str = "view_reservations";
pub const CREATE_RESERVATION: &str = "create_reservation";
pub const EDIT_RESERVATION: &str = "edit_reservation";
pub const CANCEL_RESERVATION: &str = "cancel_reservation";
pub const VIEW_FLOOR_PLAN: &str = "view_floor_plan";
pub const CREATE_FLOOR_PLAN: &str = "create_floor_plan";
pub const EDIT_FLOOR_PLAN: &str = "edit_floor_plan";
pub const DELETE_FLOOR_PLAN: &str = "delete_floor_plan";
pub const MOVE_TABLES: &str = "move_tables";
pub const MANAGE_USERS: &str = "manage_users";
pub const EDIT_PROFILE: &str = "edit_profile";

/// 全部权限（11 项）
pub const ALL_PERMISSIONS: &[&str] = &[
    VIEW_RESERVATIONS,
    CREATE_RESERVATION,
    EDIT_RESERVATION,
    CANCEL_RESERVATION,
    VIEW_FLOOR_PLAN,
    CREATE_FLOOR_PLAN,
    EDIT_FLOOR_PLAN,
    DELETE_FLOOR_PLAN,
    MOVE_TABLES,
    MANAGE_USERS,
    EDIT_PROFILE,
];

const OWNER_PERMISSIONS: &[&str] = &[
    VIEW_RESERVATIONS,
    CREATE_RESERVATION,
    EDIT_RESERVATION,
    CANCEL_RESERVATION,
    VIEW_FLOOR_PLAN,
    CREATE_FLOOR_PLAN,
    EDIT_FLOOR_PLAN,
    MOVE_TABLES,
    MANAGE_USERS,
    EDIT_PROFILE,
];

const MANAGER_PERMISSIONS: &[&str] = &[
    VIEW_RESERVATIONS,
    CREATE_RESERVATION,
    EDIT_RESERVATION,
    CANCEL_RESERVATION,
    VIEW_FLOOR_PLAN,
    EDIT_FLOOR_PLAN,
    MOVE_TABLES,
    EDIT_PROFILE,
];

const STAFF_PERMISSIONS: &[&str] = &[
    VIEW_RESERVATIONS,
    CREATE_RESERVATION,
    EDIT_RESERVATION,
    VIEW_FLOOR_PLAN,
    EDIT_PROFILE,
];

/// 自助顾客
const USER_PERMISSIONS: &[&str] = &[CREATE_RESERVATION, CANCEL_RESERVATION, EDIT_PROFILE];

static ROLE_PERMISSIONS: LazyLock<HashMap<Role, HashSet<&'static str>>> = LazyLock::new(|| {
    Role::ALL
        .iter()
        .map(|role| {
            let perms: &[&str] = match role {
                Role::Admin => ALL_PERMISSIONS,
                Role::Owner => OWNER_PERMISSIONS,
                Role::Manager => MANAGER_PERMISSIONS,
                Role::Staff => STAFF_PERMISSIONS,
                Role::User => USER_PERMISSIONS,
            };
            (*role, perms.iter().copied().collect())
        })
        .collect()
});

/// 角色是否拥有权限
pub fn has_permission(role: Role, permission: &str) -> bool {
    if role == Role::Admin {
        return true;
    }
    ROLE_PERMISSIONS
        .get(&role)
        .is_some_and(|perms| perms.contains(permission))
}

/// 角色的权限列表 (按 ALL_PERMISSIONS 顺序)
pub fn permissions_for(role: Role) -> Vec<String> {
    ALL_PERMISSIONS
        .iter()
        .filter(|p| has_permission(role, p))
        .map(|p| p.to_string())
        .collect()
}
