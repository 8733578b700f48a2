//! AppError and the JSON error envelope

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Error returned by every handler
///
/// Carries an [`ErrorCode`], a message for the client and optional
/// structured details (e.g. the conflicting reservations of a 4002).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach a detail entry
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ========== Shorthands ==========

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// `"{resource} not found"`, resource echoed in details
    pub fn not_found(resource: impl Into<String>) -> Self {
        let resource = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", resource))
            .with_detail("resource", resource)
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::AlreadyExists, msg)
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidTransition, msg)
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    /// System errors are logged server-side and masked in the response
    pub fn is_system(&self) -> bool {
        self.code.category() == ErrorCategory::System
    }
}

/// Error envelope
///
/// ```json
/// { "code": 4002, "message": "...", "details": { "conflicting_reservations": [...] } }
/// ```
///
/// Successful responses carry the entity itself, not this envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl ApiResponse<()> {
    pub fn error(err: &AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message.clone(),
            data: None,
            details: err.details.clone(),
        }
    }

    /// Code only, message replaced and details dropped
    pub fn masked(code: ErrorCode) -> Self {
        Self {
            code: Some(code.code()),
            message: code.message().to_string(),
            data: None,
            details: None,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = if self.is_system() {
            tracing::error!(code = %self.code, message = %self.message, "System error occurred");
            ApiResponse::masked(self.code)
        } else {
            ApiResponse::error(&self)
        };

        (self.http_status(), axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;

    async fn body_of(err: AppError) -> (StatusCode, ApiResponse<()>) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_default_message() {
        let err = AppError::new(ErrorCode::FloorPlanHasTables);
        assert_eq!(err.message, ErrorCode::FloorPlanHasTables.message());
        assert!(err.details.is_none());
        assert_eq!(err.to_string(), err.message);
    }

    #[test]
    fn test_shorthand_codes() {
        assert_eq!(AppError::validation("x").code, ErrorCode::ValidationFailed);
        assert_eq!(AppError::forbidden("x").code, ErrorCode::PermissionDenied);
        assert_eq!(AppError::unauthorized().http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::invalid_transition("Cannot confirm a cancelled reservation").http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let err = AppError::not_found("Table dining_table:7");
        assert_eq!(err.message, "Table dining_table:7 not found");
        assert_eq!(err.details.unwrap()["resource"], "Table dining_table:7");
    }

    #[tokio::test]
    async fn test_conflict_details_in_body() {
        let err = AppError::new(ErrorCode::ReservationConflict)
            .with_detail("conflicting_reservations", serde_json::json!([{"id": "reservation:1"}]));

        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.code, Some(4002));
        let details = body.details.unwrap();
        assert_eq!(details["conflicting_reservations"][0]["id"], "reservation:1");
    }

    #[tokio::test]
    async fn test_system_error_is_masked() {
        let (status, body) = body_of(AppError::database("index dining_table_number violated")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, Some(9002));
        assert_eq!(body.message, ErrorCode::DatabaseError.message());
        assert!(body.details.is_none());
    }
}
