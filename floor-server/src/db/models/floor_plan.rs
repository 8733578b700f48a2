//! Floor Plan Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::models::{FloorPlanStatus, Obstacle, PlanDimensions, Role};
use surrealdb::RecordId;

use super::DiningTable;

/// Floor plan entity (平面图)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorPlan {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub dimensions: PlanDimensions,
    #[serde(default)]
    pub status: FloorPlanStatus,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    #[serde(with = "serde_helpers::record_id")]
    pub created_by: RecordId,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub last_modified_by: Option<RecordId>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl FloorPlan {
    /// 创建者、ADMIN 或 OWNER 可修改
    pub fn can_be_modified_by(&self, user_id: &str, role: Role) -> bool {
        matches!(role, Role::Admin | Role::Owner) || self.created_by.to_string() == user_id
    }
}

/// 平面图详情 (含桌台)
#[derive(Debug, Clone, Serialize)]
pub struct FloorPlanDetail {
    #[serde(flatten)]
    pub floor_plan: FloorPlan,
    pub tables: Vec<DiningTable>,
}
