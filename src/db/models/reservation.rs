use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Date, OffsetDateTime};
use validator::Validate;

use crate::scheduling::clock::CivilTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "reservation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    /// Live reservations occupy their slot; rejected and cancelled ones are
    /// retained for audit only and never block a booking.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::Completed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled | Self::Completed)
    }
}

/// Ledger entry. `end_time` is computed once at commit from the service's
/// duration at that moment and never recomputed. Rows are never deleted.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub customer_id: Uuid,
    pub service_id: Uuid,
    pub date: Date,
    pub start_time: CivilTime,
    pub end_time: CivilTime,
    pub status: ReservationStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommitReservation {
    pub provider_id: Uuid,
    pub customer_id: Uuid,
    pub service_id: Uuid,
    pub date: Date,
    pub start_time: CivilTime,
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub target_status: ReservationStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReservationFilter {
    pub provider_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub status: Option<ReservationStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_and_terminal_partition() {
        assert!(ReservationStatus::Pending.is_live());
        assert!(ReservationStatus::Confirmed.is_live());
        assert!(ReservationStatus::Completed.is_live());
        assert!(!ReservationStatus::Rejected.is_live());
        assert!(!ReservationStatus::Cancelled.is_live());

        // Completed is both live (it occupied its slot) and terminal.
        assert!(ReservationStatus::Completed.is_terminal());
        assert!(ReservationStatus::Rejected.is_terminal());
        assert!(ReservationStatus::Cancelled.is_terminal());
        assert!(!ReservationStatus::Pending.is_terminal());
        assert!(!ReservationStatus::Confirmed.is_terminal());
    }

    #[test]
    fn status_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&ReservationStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        let back: ReservationStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(back, ReservationStatus::Cancelled);
    }
}
