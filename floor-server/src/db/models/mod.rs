//! Database Models
//!
//! 数据库实体。所有 RecordId 字段对外序列化为 "table:id" 字符串。

pub mod serde_helpers;

pub mod dining_table;
pub mod floor_plan;
pub mod reservation;
pub mod user;

pub use dining_table::*;
pub use floor_plan::*;
pub use reservation::*;
pub use user::*;
