//! Shared types for the floor server
//!
//! Error types, response envelope, domain enums and request payloads used
//! by the server and its clients.

pub mod error;
pub mod models;
pub mod util;

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
