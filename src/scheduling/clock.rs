use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, Time};

use crate::error::{AppError, AppResult};

pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Provider-local wall-clock time with no timezone attached. All slot
/// arithmetic happens in minutes since midnight.
///
/// Serializes as `"HH:MM"`, the format providers configure their hours in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct CivilTime(Time);

impl CivilTime {
    pub fn new(hour: u8, minute: u8) -> AppResult<Self> {
        Time::from_hms(hour, minute, 0)
            .map(CivilTime)
            .map_err(|_| AppError::InvalidTime(format!("{hour:02}:{minute:02} is out of range")))
    }

    pub fn hour(&self) -> u8 {
        self.0.hour()
    }

    pub fn minute(&self) -> u8 {
        self.0.minute()
    }

    pub fn to_minutes(self) -> i32 {
        self.hour() as i32 * 60 + self.minute() as i32
    }

    pub fn from_minutes(minutes: i32) -> AppResult<Self> {
        if !(0..MINUTES_PER_DAY).contains(&minutes) {
            return Err(AppError::InvalidTime(format!(
                "{minutes} minutes is outside the civil day"
            )));
        }
        Self::new((minutes / 60) as u8, (minutes % 60) as u8)
    }

    pub fn add_minutes(self, delta: i32) -> AppResult<Self> {
        Self::from_minutes(self.to_minutes() + delta)
    }
}

/// Half-open interval overlap: `[a_start, a_end)` against `[b_start, b_end)`.
/// Back-to-back slots share a boundary and do not conflict. Generic so the
/// slot generator can compare raw minute offsets, where an interval end may
/// lie past midnight.
pub fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && b_start < a_end
}

/// Day-of-week index with 0 = Sunday .. 6 = Saturday.
pub fn day_index(date: Date) -> i16 {
    date.weekday().number_days_from_sunday() as i16
}

impl fmt::Display for CivilTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for CivilTime {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hour, minute) = s
            .split_once(':')
            .ok_or_else(|| AppError::InvalidTime(format!("expected HH:MM, got {s:?}")))?;
        let hour: u8 = hour
            .parse()
            .map_err(|_| AppError::InvalidTime(format!("bad hour in {s:?}")))?;
        let minute: u8 = minute
            .parse()
            .map_err(|_| AppError::InvalidTime(format!("bad minute in {s:?}")))?;
        Self::new(hour, minute)
    }
}

impl Serialize for CivilTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CivilTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn t(hour: u8, minute: u8) -> CivilTime {
        CivilTime::new(hour, minute).unwrap()
    }

    #[test]
    fn minute_arithmetic_round_trips() {
        assert_eq!(t(9, 30).to_minutes(), 570);
        assert_eq!(CivilTime::from_minutes(570).unwrap(), t(9, 30));
        assert_eq!(CivilTime::from_minutes(0).unwrap(), t(0, 0));
        assert_eq!(CivilTime::from_minutes(1439).unwrap(), t(23, 59));
    }

    #[test]
    fn from_minutes_rejects_out_of_day_values() {
        assert!(matches!(
            CivilTime::from_minutes(-1),
            Err(AppError::InvalidTime(_))
        ));
        assert!(matches!(
            CivilTime::from_minutes(1440),
            Err(AppError::InvalidTime(_))
        ));
    }

    #[test]
    fn add_minutes_fails_past_midnight() {
        assert_eq!(t(10, 0).add_minutes(45).unwrap(), t(10, 45));
        assert!(t(23, 30).add_minutes(60).is_err());
    }

    #[test]
    fn invalid_components_rejected() {
        assert!(CivilTime::new(24, 0).is_err());
        assert!(CivilTime::new(12, 60).is_err());
    }

    #[test]
    fn overlap_is_half_open() {
        // Plain overlap.
        assert!(overlaps(t(9, 0), t(10, 0), t(9, 30), t(10, 30)));
        // Containment.
        assert!(overlaps(t(9, 0), t(12, 0), t(10, 0), t(10, 30)));
        // Back-to-back intervals never conflict.
        assert!(!overlaps(t(9, 0), t(10, 0), t(10, 0), t(11, 0)));
        assert!(!overlaps(t(10, 0), t(11, 0), t(9, 0), t(10, 0)));
        // Disjoint.
        assert!(!overlaps(t(9, 0), t(9, 30), t(11, 0), t(11, 30)));
    }

    #[test]
    fn parses_and_formats_hh_mm() {
        let parsed: CivilTime = "09:30".parse().unwrap();
        assert_eq!(parsed, t(9, 30));
        assert_eq!(parsed.to_string(), "09:30");
        assert!("9h30".parse::<CivilTime>().is_err());
        assert!("25:00".parse::<CivilTime>().is_err());
    }

    #[test]
    fn day_index_starts_at_sunday() {
        assert_eq!(day_index(date!(2026 - 08 - 30)), 0); // Sunday
        assert_eq!(day_index(date!(2026 - 08 - 31)), 1); // Monday
        assert_eq!(day_index(date!(2026 - 09 - 05)), 6); // Saturday
    }
}
