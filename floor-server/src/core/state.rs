use std::path::PathBuf;
use std::sync::Arc;

use shared::models::Role;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::auth::password::hash_password;
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;
use crate::db::models::NewUser;
use crate::db::repository::UserRepository;
use crate::reservations::{ReservationEngine, TableLocks};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，每个请求克隆一份成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | table_locks | Arc<TableLocks> | 进程内桌台锁 |
///
/// # 使用示例
///
/// ```ignore
/// let db = state.get_db();
/// let engine = state.reservation_engine();
/// let reservation = engine.get(&user, "reservation:123").await?;
/// ```
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 桌台锁，所有预订写操作共享同一份
    pub table_locks: Arc<TableLocks>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`] 代替
    pub fn new(config: Config, db: Surreal<Db>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            config,
            db,
            jwt_service,
            table_locks: Arc::new(TableLocks::new()),
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 创建工作目录
    /// 2. 打开数据库并应用 schema
    /// 3. 创建初始管理员 (如已配置)
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let db_service = DbService::new(config.database_dir()).await?;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let state = Self::new(config.clone(), db_service.db, jwt_service);

        state.ensure_bootstrap_admin().await?;
        Ok(state)
    }

    /// 配置了 ADMIN_EMAIL / ADMIN_PASSWORD 且该邮箱不存在时创建 ADMIN
    async fn ensure_bootstrap_admin(&self) -> Result<()> {
        let Some(admin) = &self.config.bootstrap_admin else {
            return Ok(());
        };

        let repo = UserRepository::new(self.get_db());
        if repo.find_by_email(&admin.email).await?.is_some() {
            return Ok(());
        }

        let hash_pass = hash_password(&admin.password)
            .map_err(|e| ServerError::Config(format!("Failed to hash admin password: {}", e)))?;
        let user = repo
            .create(NewUser {
                username: admin.username.clone(),
                email: admin.email.clone(),
                hash_pass,
                first_name: None,
                last_name: None,
                phone: None,
                role: Role::Admin,
            })
            .await?;

        tracing::info!(user_id = %user.id_string(), email = %user.email, "Bootstrap admin created");
        Ok(())
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 预订引擎 (共享桌台锁)
    pub fn reservation_engine(&self) -> ReservationEngine {
        ReservationEngine::new(self.get_db(), self.table_locks.clone())
    }
}
