//! Reservation Model

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Reservation lifecycle status
///
/// `pending` and `confirmed` are active; the other three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    #[serde(rename = "no-show")]
    NoShow,
}

impl ReservationStatus {
    pub const ACTIVE: [ReservationStatus; 2] =
        [ReservationStatus::Pending, ReservationStatus::Confirmed];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Completed => "completed",
            ReservationStatus::NoShow => "no-show",
        }
    }

    /// Active reservations hold their tables
    pub const fn is_active(&self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Confirmed)
    }

    pub const fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contact details for guests without an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CustomerInfo {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3, max = 30))]
    pub phone: String,
}

/// Create reservation payload
///
/// Times are Unix milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReservationCreate {
    /// Account the reservation is for ("user:id"); staff only
    pub user: Option<String>,
    pub customer_info: Option<CustomerInfo>,
    pub start_time: i64,
    pub end_time: i64,
    /// Table references ("dining_table:id")
    #[validate(length(min = 1, max = 20))]
    pub tables: Vec<String>,
    /// Floor plan reference ("floor_plan:id")
    pub floor_plan: String,
    #[validate(range(min = 1, max = 500))]
    pub guests: i32,
    #[serde(default)]
    pub special_occasion: bool,
    #[validate(length(max = 500))]
    pub special_occasion_details: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Update reservation payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ReservationUpdate {
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    #[validate(length(min = 1, max = 20))]
    pub tables: Option<Vec<String>>,
    #[validate(range(min = 1, max = 500))]
    pub guests: Option<i32>,
    pub special_occasion: Option<bool>,
    #[validate(length(max = 500))]
    pub special_occasion_details: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    pub customer_info: Option<CustomerInfo>,
    pub status: Option<ReservationStatus>,
}

impl ReservationUpdate {
    /// Whether the overlap check has to run again
    pub fn touches_schedule(&self) -> bool {
        self.start_time.is_some() || self.end_time.is_some() || self.tables.is_some()
    }
}

/// POST /api/reservations/{id}/cancel
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CancelRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&ReservationStatus::NoShow).unwrap(),
            "\"no-show\""
        );
        let status: ReservationStatus = serde_json::from_str("\"confirmed\"").unwrap();
        assert_eq!(status, ReservationStatus::Confirmed);
    }

    #[test]
    fn test_status_activity() {
        assert!(ReservationStatus::Pending.is_active());
        assert!(ReservationStatus::Confirmed.is_active());
        assert!(ReservationStatus::Cancelled.is_terminal());
        assert!(ReservationStatus::Completed.is_terminal());
        assert!(ReservationStatus::NoShow.is_terminal());
    }

    #[test]
    fn test_customer_info_validation() {
        let info = CustomerInfo {
            name: "Ada".into(),
            email: "not-an-email".into(),
            phone: "0601020304".into(),
        };
        assert!(info.validate().is_err());
    }

    #[test]
    fn test_create_requires_tables() {
        let json = r#"{"start_time":0,"end_time":1,"tables":[],"floor_plan":"floor_plan:1","guests":2}"#;
        let payload: ReservationCreate = serde_json::from_str(json).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_touches_schedule() {
        let update = ReservationUpdate {
            notes: Some("window seat".into()),
            ..Default::default()
        };
        assert!(!update.touches_schedule());

        let update = ReservationUpdate {
            end_time: Some(10),
            ..Default::default()
        };
        assert!(update.touches_schedule());
    }
}
