//! User Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::models::{Role, UserInfo};
use surrealdb::RecordId;

/// User ID type
pub type UserId = RecordId;

/// User account (用户)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<UserId>,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hash_pass: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: Role,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub two_factor_enabled: bool,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

impl User {
    /// "user:123" 形式的 ID
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }

    /// 转换为登录响应中的用户信息
    pub fn to_info(&self, permissions: Vec<String>) -> UserInfo {
        UserInfo {
            id: self.id_string(),
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
            permissions,
            two_factor_enabled: self.two_factor_enabled,
        }
    }
}

/// 新建用户 (密码已哈希)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub hash_pass: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
}
