//! Dining Table Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::models::{Dimensions, Position, TableShape, TableStatus};
use surrealdb::RecordId;

/// Dining table entity (桌台)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub number: i32,
    pub capacity: i32,
    #[serde(default)]
    pub shape: TableShape,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub dimensions: Dimensions,
    #[serde(default)]
    pub status: TableStatus,
    /// Floor plan reference
    #[serde(with = "serde_helpers::record_id")]
    pub floor_plan: RecordId,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub last_modified_by: Option<RecordId>,
    #[serde(default)]
    pub last_modified_at: i64,
}

/// 新建桌台 (已校验)
#[derive(Debug, Clone)]
pub struct NewDiningTable {
    pub number: i32,
    pub capacity: i32,
    pub shape: TableShape,
    pub position: Position,
    pub rotation: f64,
    pub dimensions: Dimensions,
    pub floor_plan: RecordId,
}

/// 桌台过滤条件
#[derive(Debug, Clone, Default)]
pub struct TableFilter {
    pub floor_plan: Option<RecordId>,
    pub status: Option<TableStatus>,
    pub min_capacity: Option<i32>,
}
