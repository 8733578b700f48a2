//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 注册、登录、当前账号
//! - [`users`] - 用户管理
//! - [`role`] - 角色与权限 (只读)
//! - [`floor_plans`] - 平面图管理
//! - [`tables`] - 桌台管理
//! - [`reservations`] - 预订与可用性查询

pub mod auth;
pub mod floor_plans;
pub mod health;
pub mod reservations;
pub mod role;
pub mod tables;
pub mod users;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
