//! Repository Module
//!
//! Provides CRUD operations for SurrealDB tables.

pub mod dining_table;
pub mod floor_plan;
pub mod reservation;
pub mod user;

// Re-exports
pub use dining_table::DiningTableRepository;
pub use floor_plan::FloorPlanRepository;
pub use reservation::{ReservationRepository, ReservationWrite, TableCascade};
pub use user::UserRepository;

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

use crate::utils::AppError;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        // 唯一索引冲突: "Database index `x` already contains ..."
        if msg.contains("already contains") || msg.contains("already exists") {
            RepoError::Duplicate(msg)
        } else {
            RepoError::Database(msg)
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::not_found(msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// 使用 surrealdb::RecordId 处理所有 ID：
//   - 解析: parse_record_id("reservation", "reservation:123")?
//   - 创建: new_record_id("reservation") (snowflake key)
//   - CRUD: db.select(id) / db.delete(id) 直接使用 RecordId
//   - 写入: 始终 bind RecordId 本身，避免被序列化为字符串

/// 解析 "table:id" 并校验表名
pub fn parse_record_id(table: &str, id: &str) -> RepoResult<RecordId> {
    let thing: RecordId = id
        .parse()
        .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
    if thing.table() != table {
        return Err(RepoError::Validation(format!(
            "Invalid ID: {} (expected {} record)",
            id, table
        )));
    }
    Ok(thing)
}

/// 生成新的记录 ID (snowflake key)
pub fn new_record_id(table: &str) -> RecordId {
    RecordId::from_table_key(table, shared::util::snowflake_id())
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
