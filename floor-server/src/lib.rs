//! Floor Server - 餐厅平面图与订座后端
//!
//! # 架构概述
//!
//! - **数据库** (`db`): 嵌入式 SurrealDB (RocksDB) 存储
//! - **认证** (`auth`): JWT + Argon2，按角色的固定权限表
//! - **预订引擎** (`reservations`): 冲突检测、状态机、桌台级联、桌台锁
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! floor-server/src/
//! ├── core/          # 配置、状态、服务器、错误
//! ├── auth/          # JWT 认证、权限、中间件
//! ├── reservations/  # 预订引擎
//! ├── services/      # 路由组装、HTTP 中间件
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 日志、时间、校验
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod reservations;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use reservations::{ReservationEngine, ReservationError};
pub use services::build_router;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 创建日志目录并初始化日志
pub fn setup_environment(config: &Config) -> std::io::Result<()> {
    std::fs::create_dir_all(config.logs_dir())?;
    let logs_dir = config.logs_dir();
    init_logger_with_file(
        Some(&config.log_level),
        Some(config.log_json),
        logs_dir.to_str(),
    );
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ________
   / ____/ /___  ____  _____
  / /_  / / __ \/ __ \/ ___/
 / __/ / / /_/ / /_/ / /
/_/   /_/\____/\____/_/
    "#
    );
}
