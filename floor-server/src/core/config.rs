use std::path::PathBuf;

use chrono_tz::Tz;

use crate::auth::JwtConfig;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | TIMEZONE | Europe/Paris | 业务时区 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | REQUIRE_TWO_FACTOR | false | ADMIN/OWNER 必须开启双因素认证 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志格式 |
/// | ADMIN_EMAIL | - | 初始管理员邮箱 |
/// | ADMIN_USERNAME | admin | 初始管理员用户名 |
/// | ADMIN_PASSWORD | - | 初始管理员密码 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/floor HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 业务时区 (日期过滤、可用性查询)
    pub timezone: Tz,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 是否对 ADMIN/OWNER 强制双因素认证
    pub require_two_factor: bool,
    /// 日志级别
    pub log_level: String,
    /// JSON 日志
    pub log_json: bool,
    /// 启动时创建的管理员账号 (邮箱和密码都设置时生效)
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// 初始管理员账号
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl BootstrapAdmin {
    fn from_env() -> Option<Self> {
        let email = std::env::var("ADMIN_EMAIL").ok().filter(|v| !v.trim().is_empty())?;
        let password = std::env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty())?;
        Some(Self {
            email: email.trim().to_lowercase(),
            username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            password,
        })
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            timezone: std::env::var("TIMEZONE")
                .ok()
                .and_then(|tz| match tz.parse::<Tz>() {
                    Ok(tz) => Some(tz),
                    Err(_) => {
                        tracing::warn!(timezone = %tz, "Unknown TIMEZONE, falling back to Europe/Paris");
                        None
                    }
                })
                .unwrap_or(chrono_tz::Europe::Paris),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            require_two_factor: std::env::var("REQUIRE_TWO_FACTOR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            bootstrap_admin: BootstrapAdmin::from_env(),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.bootstrap_admin = None;
        config
    }

    /// 数据库目录: {work_dir}/database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 日志目录: {work_dir}/logs
    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_and_paths() {
        let config = Config::with_overrides("/tmp/floor-test", 4100);
        assert_eq!(config.http_port, 4100);
        assert_eq!(config.database_dir(), PathBuf::from("/tmp/floor-test/database"));
        assert_eq!(config.logs_dir(), PathBuf::from("/tmp/floor-test/logs"));
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn test_bootstrap_admin_debug_hides_password() {
        let admin = BootstrapAdmin {
            email: "root@example.com".into(),
            username: "admin".into(),
            password: "hunter2-hunter2".into(),
        };
        let out = format!("{:?}", admin);
        assert!(out.contains("root@example.com"));
        assert!(!out.contains("hunter2"));
    }
}
