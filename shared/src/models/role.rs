//! Role Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role (角色)
///
/// Closed set; the permission table for each role lives in the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Owner,
    Manager,
    Staff,
    User,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Owner,
        Role::Manager,
        Role::Staff,
        Role::User,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Owner => "OWNER",
            Role::Manager => "MANAGER",
            Role::Staff => "STAFF",
            Role::User => "USER",
        }
    }

    /// ADMIN, OWNER and MANAGER bypass ownership checks on reservations
    pub const fn is_elevated(&self) -> bool {
        matches!(self, Role::Admin | Role::Owner | Role::Manager)
    }

    /// Roles that must enable two-factor authentication when it is enforced
    pub const fn requires_two_factor(&self) -> bool {
        matches!(self, Role::Admin | Role::Owner)
    }

    /// Self-service customers; everything else is staff
    pub const fn is_customer(&self) -> bool {
        matches!(self, Role::User)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unknown role name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "OWNER" => Ok(Role::Owner),
            "MANAGER" => Ok(Role::Manager),
            "STAFF" => Ok(Role::Staff),
            "USER" => Ok(Role::User),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// Role with its permission list (GET /api/roles)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePermissions {
    pub role: Role,
    pub permissions: Vec<String>,
}

/// Role change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}
