//! Data models
//!
//! Wire types shared between the floor server and its clients.
//! References to other records are "table:id" strings.

pub mod dining_table;
pub mod floor_plan;
pub mod reservation;
pub mod role;
pub mod user;

// Re-exports
pub use dining_table::*;
pub use floor_plan::*;
pub use reservation::*;
pub use role::*;
pub use user::*;
