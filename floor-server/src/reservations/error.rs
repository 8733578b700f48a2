use shared::models::ReservationStatus;
use shared::{AppError, ErrorCode};
use thiserror::Error;

use crate::db::models::Reservation;
use crate::db::repository::RepoError;

/// Reservation engine errors
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("End time must be after start time")]
    InvalidTimeRange,

    #[error("Customer information is required")]
    CustomerRequired,

    #[error("Tables are already reserved for this time ({} conflicting)", .0.len())]
    Conflict(Vec<Reservation>),

    #[error("Cannot {action} a {current} reservation")]
    InvalidTransition {
        current: ReservationStatus,
        action: &'static str,
    },

    #[error("Reservation not found: {0}")]
    ReservationNotFound(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Floor plan has no tables: {0}")]
    NoTables(String),

    #[error("Table has upcoming reservations: {0}")]
    TableInUse(String),

    #[error("Floor plan not found: {0}")]
    FloorPlanNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    Repo(#[from] RepoError),
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::Validation(msg) => AppError::validation(msg),
            ReservationError::InvalidTimeRange => AppError::new(ErrorCode::InvalidTimeRange),
            ReservationError::CustomerRequired => AppError::new(ErrorCode::CustomerRequired),
            ReservationError::Conflict(conflicting) => {
                let message = format!(
                    "Tables are already reserved for this time ({} conflicting)",
                    conflicting.len()
                );
                let details = serde_json::to_value(&conflicting).unwrap_or_default();
                AppError::with_message(ErrorCode::ReservationConflict, message)
                    .with_detail("conflicting_reservations", details)
            }
            err @ ReservationError::InvalidTransition { .. } => {
                AppError::invalid_transition(err.to_string())
            }
            ReservationError::ReservationNotFound(id) => AppError::with_message(
                ErrorCode::ReservationNotFound,
                format!("Reservation {} not found", id),
            ),
            ReservationError::TableNotFound(id) => AppError::with_message(
                ErrorCode::TableNotFound,
                format!("Table {} not found", id),
            ),
            ReservationError::NoTables(id) => AppError::with_message(
                ErrorCode::TableNotFound,
                format!("Floor plan {} has no tables", id),
            ),
            ReservationError::TableInUse(id) => AppError::with_message(
                ErrorCode::TableHasReservations,
                format!("Table {} is referenced by an upcoming reservation", id),
            ),
            ReservationError::FloorPlanNotFound(id) => AppError::with_message(
                ErrorCode::FloorPlanNotFound,
                format!("Floor plan {} not found", id),
            ),
            ReservationError::UserNotFound(id) => AppError::with_message(
                ErrorCode::UserNotFound,
                format!("User {} not found", id),
            ),
            ReservationError::Forbidden(msg) => AppError::forbidden(msg),
            ReservationError::Repo(e) => {
                tracing::error!(error = %e, "Reservation storage error");
                e.into()
            }
        }
    }
}

pub type ReservationResult<T> = Result<T, ReservationError>;
