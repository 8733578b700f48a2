//! 预订状态机
//!
//! ```text
//! pending ──confirm──▶ confirmed ──complete──▶ completed
//!    │                    │  └────no-show───▶ no-show
//!    └──────cancel────────┴──────cancel─────▶ cancelled
//! ```
//!
//! cancelled / completed / no-show 为终态，任何动作都会被拒绝。

use std::fmt;

use shared::models::{ReservationStatus, Role, TableStatus};

use super::error::{ReservationError, ReservationResult};

/// 预订动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationAction {
    Confirm,
    Cancel,
    Complete,
    NoShow,
}

impl ReservationAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReservationAction::Confirm => "confirm",
            ReservationAction::Cancel => "cancel",
            ReservationAction::Complete => "complete",
            ReservationAction::NoShow => "no-show",
        }
    }

    /// 到达 `target` 状态所需的动作 (用于 PUT 中直接修改 status)
    pub const fn for_target(target: ReservationStatus) -> Option<Self> {
        match target {
            ReservationStatus::Confirmed => Some(ReservationAction::Confirm),
            ReservationStatus::Cancelled => Some(ReservationAction::Cancel),
            ReservationStatus::Completed => Some(ReservationAction::Complete),
            ReservationStatus::NoShow => Some(ReservationAction::NoShow),
            ReservationStatus::Pending => None,
        }
    }
}

impl fmt::Display for ReservationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 计算动作后的状态
///
/// 源状态不合法时返回 [`ReservationError::InvalidTransition`]，携带当前状态。
pub fn transition(
    current: ReservationStatus,
    action: ReservationAction,
) -> ReservationResult<ReservationStatus> {
    use ReservationAction as A;
    use ReservationStatus as S;

    match (current, action) {
        (S::Pending, A::Confirm) => Ok(S::Confirmed),
        (S::Pending | S::Confirmed, A::Cancel) => Ok(S::Cancelled),
        (S::Confirmed, A::Complete) => Ok(S::Completed),
        (S::Confirmed, A::NoShow) => Ok(S::NoShow),
        _ => Err(ReservationError::InvalidTransition {
            current,
            action: action.as_str(),
        }),
    }
}

/// 新建预订的初始状态: 自助用户 pending，员工 confirmed
pub const fn initial_status(role: Role) -> ReservationStatus {
    if role.is_customer() {
        ReservationStatus::Pending
    } else {
        ReservationStatus::Confirmed
    }
}

/// 预订进入 `status` 后其桌台应处的状态，`None` 表示不级联
pub const fn cascade_for(status: ReservationStatus) -> Option<TableStatus> {
    match status {
        ReservationStatus::Pending => None,
        ReservationStatus::Confirmed => Some(TableStatus::Reserved),
        ReservationStatus::Cancelled | ReservationStatus::Completed | ReservationStatus::NoShow => {
            Some(TableStatus::Free)
        }
    }
}
