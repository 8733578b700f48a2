//! User Model

use super::role::Role;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register payload (always creates a USER account)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
}

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// Public account information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub two_factor_enabled: bool,
}

/// Update user payload
///
/// `email` and `is_active` are only honoured for user managers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 3, max = 50))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

/// Password change payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordChange {
    /// Required when changing one's own password
    pub current_password: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation() {
        let ok = RegisterRequest {
            username: "marie".into(),
            email: "marie@example.com".into(),
            password: "correct-horse".into(),
            first_name: None,
            last_name: None,
            phone: None,
        };
        assert!(ok.validate().is_ok());

        let short = RegisterRequest {
            password: "short".into(),
            ..ok.clone()
        };
        assert!(short.validate().is_err());

        let bad_email = RegisterRequest {
            email: "marie".into(),
            ..ok
        };
        assert!(bad_email.validate().is_err());
    }
}
