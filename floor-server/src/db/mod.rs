//! Database Module
//!
//! 嵌入式 SurrealDB (RocksDB 引擎) 连接与 schema 初始化

pub mod models;
pub mod repository;

use std::path::Path;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use repository::{RepoError, RepoResult};

/// 命名空间 / 数据库
pub const NAMESPACE: &str = "floor";
pub const DATABASE: &str = "main";

/// Schema 定义 (启动时幂等执行)
///
/// 表为 SCHEMALESS，唯一性由索引保证。
pub const SCHEMA: &str = r#"
-- ============================================
-- Users
-- ============================================
DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
DEFINE INDEX IF NOT EXISTS user_email ON user FIELDS email UNIQUE;
DEFINE INDEX IF NOT EXISTS user_username ON user FIELDS username UNIQUE;

-- ============================================
-- Floor plans
-- ============================================
DEFINE TABLE IF NOT EXISTS floor_plan SCHEMALESS;
DEFINE INDEX IF NOT EXISTS floor_plan_name ON floor_plan FIELDS name UNIQUE;

-- ============================================
-- Dining tables
-- ============================================
DEFINE TABLE IF NOT EXISTS dining_table SCHEMALESS;
DEFINE INDEX IF NOT EXISTS dining_table_number ON dining_table FIELDS floor_plan, number UNIQUE;

-- ============================================
-- Reservations
-- ============================================
DEFINE TABLE IF NOT EXISTS reservation SCHEMALESS;
DEFINE INDEX IF NOT EXISTS reservation_floor_plan ON reservation FIELDS floor_plan;
DEFINE INDEX IF NOT EXISTS reservation_start_time ON reservation FIELDS start_time;
"#;

/// Database service - owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// 打开 (或创建) RocksDB 数据库并应用 schema
    pub async fn new(path: impl AsRef<Path>) -> RepoResult<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)
            .map_err(|e| RepoError::Database(format!("Failed to create database dir: {e}")))?;

        let db: Surreal<Db> = Surreal::new::<RocksDb>(path).await?;
        db.use_ns(NAMESPACE).use_db(DATABASE).await?;
        tracing::info!(path = %path.display(), "Database connection established (SurrealDB/RocksDB)");

        db.query(SCHEMA).await?.check()?;
        tracing::info!("Database schema applied");

        Ok(Self { db })
    }
}
