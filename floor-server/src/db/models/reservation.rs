//! Reservation Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::models::{CustomerInfo, ReservationStatus};
use surrealdb::RecordId;

/// Reservation entity (预订)
///
/// `user` 与 `customer_info` 恰好存在一个。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub user: Option<RecordId>,
    #[serde(default)]
    pub customer_info: Option<CustomerInfo>,
    pub start_time: i64,
    pub end_time: i64,
    #[serde(with = "serde_helpers::vec_record_id")]
    pub tables: Vec<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub floor_plan: RecordId,
    pub status: ReservationStatus,
    pub guests: i32,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub special_occasion: bool,
    #[serde(default)]
    pub special_occasion_details: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(with = "serde_helpers::record_id")]
    pub created_by: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub last_modified_by: RecordId,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Reservation {
    /// 是否属于该用户
    pub fn belongs_to(&self, user_id: &str) -> bool {
        self.user
            .as_ref()
            .is_some_and(|u| u.to_string() == user_id)
    }

    /// 是否引用某桌台
    pub fn uses_table(&self, table: &RecordId) -> bool {
        self.tables.contains(table)
    }
}

/// 预订过滤条件
///
/// 时间窗口为半开区间 `[from, to)`，按 start_time 过滤。
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub status: Option<ReservationStatus>,
    pub user: Option<RecordId>,
    pub table: Option<RecordId>,
    pub floor_plan: Option<RecordId>,
}
