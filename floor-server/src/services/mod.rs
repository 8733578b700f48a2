//! 服务层
//!
//! - [`http`] - 路由组装与 HTTP 中间件

pub mod http;

pub use self::http::{build_app, build_router};
