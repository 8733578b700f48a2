//! 预订引擎
//!
//! - [`overlap`] - 半开区间冲突检测
//! - [`state_machine`] - 状态流转与桌台级联规则
//! - [`policy`] - 授权判定 (is_self / can_edit / can_cancel)
//! - [`availability`] - 可用桌台计算
//! - [`locks`] - 按桌台加锁，保证检测与写入原子
//! - [`engine`] - 组合以上部分的 [`ReservationEngine`]

pub mod availability;
pub mod engine;
pub mod error;
pub mod locks;
pub mod overlap;
pub mod policy;
pub mod state_machine;

pub use availability::Availability;
pub use engine::ReservationEngine;
pub use error::{ReservationError, ReservationResult};
pub use locks::TableLocks;
pub use state_machine::ReservationAction;
