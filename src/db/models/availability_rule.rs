use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::scheduling::clock::CivilTime;

/// One recurring weekly window during which a provider accepts bookings.
/// A provider may own any number of rules per weekday.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub day_of_week: i16, // 0 = Sunday .. 6 = Saturday
    pub start_time: CivilTime,
    pub end_time: CivilTime,
    pub active: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewAvailabilityRule {
    pub day_of_week: i16,
    pub start_time: CivilTime,
    pub end_time: CivilTime,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAvailabilityRule {
    pub day_of_week: Option<i16>,
    pub start_time: Option<CivilTime>,
    pub end_time: Option<CivilTime>,
    pub active: Option<bool>,
}

/// Rejects rules that could never yield a slot. Two rules overlapping on the
/// same day are deliberately accepted; the slot generator merges them.
pub fn validate_rule(day_of_week: i16, start_time: CivilTime, end_time: CivilTime) -> AppResult<()> {
    if !(0..=6).contains(&day_of_week) {
        return Err(AppError::InvalidRule(format!(
            "day_of_week must be 0..=6, got {day_of_week}"
        )));
    }
    if start_time >= end_time {
        return Err(AppError::InvalidRule(format!(
            "start_time {start_time} must be before end_time {end_time}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u8, minute: u8) -> CivilTime {
        CivilTime::new(hour, minute).unwrap()
    }

    #[test]
    fn accepts_well_formed_rules() {
        assert!(validate_rule(1, t(9, 0), t(17, 0)).is_ok());
        assert!(validate_rule(0, t(0, 0), t(0, 30)).is_ok());
        assert!(validate_rule(6, t(23, 0), t(23, 59)).is_ok());
    }

    #[test]
    fn rejects_inverted_or_empty_windows() {
        assert!(matches!(
            validate_rule(1, t(17, 0), t(9, 0)),
            Err(AppError::InvalidRule(_))
        ));
        assert!(matches!(
            validate_rule(1, t(9, 0), t(9, 0)),
            Err(AppError::InvalidRule(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_weekday() {
        assert!(validate_rule(-1, t(9, 0), t(10, 0)).is_err());
        assert!(validate_rule(7, t(9, 0), t(10, 0)).is_err());
    }
}
