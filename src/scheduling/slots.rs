use std::collections::BTreeMap;

use serde::Serialize;

use crate::db::{AvailabilityRule, Reservation};
use crate::error::{AppError, AppResult};
use crate::scheduling::clock::{overlaps, CivilTime};

/// Candidate start times are generated on a fixed half-hour grid, matching
/// the granularity providers configure their hours in.
pub const SLOT_STEP_MINUTES: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub start_time: CivilTime,
    pub available: bool,
}

/// Slot projection for one provider-day: a blackout empties the whole day,
/// whatever the weekly rules say; otherwise the generator runs over the
/// snapshot. Pure function of its inputs; the caller fetches a consistent
/// snapshot.
pub fn day_slots(
    blackout: bool,
    rules: &[AvailabilityRule],
    reservations: &[Reservation],
    duration_minutes: i32,
) -> AppResult<Vec<Slot>> {
    if duration_minutes <= 0 {
        return Err(AppError::InvalidDuration(duration_minutes));
    }
    if blackout {
        return Ok(Vec::new());
    }
    generate_slots(rules, reservations, duration_minutes)
}

/// Projects a provider's weekly rules and the day's committed reservations
/// into an ordered list of candidate slots. Pure function of its inputs; the
/// caller is responsible for fetching a consistent snapshot.
///
/// The cursor walks while `cursor < rule.end_time`, not while the full
/// service duration still fits. A slot near closing time is therefore
/// offered even though the appointment would run past closing, and the
/// commit path accepts it all the same. Tightening the loop condition to
/// `cursor + duration <= end_time` would remove start times customers can
/// book today; that is a product decision, not a bug fix.
pub fn generate_slots(
    rules: &[AvailabilityRule],
    reservations: &[Reservation],
    duration_minutes: i32,
) -> AppResult<Vec<Slot>> {
    if duration_minutes <= 0 {
        return Err(AppError::InvalidDuration(duration_minutes));
    }

    let live: Vec<(i32, i32)> = reservations
        .iter()
        .filter(|r| r.status.is_live())
        .map(|r| (r.start_time.to_minutes(), r.end_time.to_minutes()))
        .collect();

    // Keyed by minute-of-day so candidates from overlapping rules collapse
    // into one entry; availability is the union across rules.
    let mut merged: BTreeMap<i32, bool> = BTreeMap::new();

    for rule in rules.iter().filter(|r| r.active) {
        let end = rule.end_time.to_minutes();
        let mut cursor = rule.start_time.to_minutes();
        while cursor < end {
            let candidate_end = cursor + duration_minutes;
            let booked = live
                .iter()
                .any(|&(r_start, r_end)| overlaps(cursor, candidate_end, r_start, r_end));
            let entry = merged.entry(cursor).or_insert(false);
            *entry = *entry || !booked;
            cursor += SLOT_STEP_MINUTES;
        }
    }

    merged
        .into_iter()
        .map(|(minutes, available)| {
            Ok(Slot {
                start_time: CivilTime::from_minutes(minutes)?,
                available,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ReservationStatus;
    use sqlx::types::Uuid;
    use time::macros::date;
    use time::OffsetDateTime;

    fn t(hour: u8, minute: u8) -> CivilTime {
        CivilTime::new(hour, minute).unwrap()
    }

    fn rule(day_of_week: i16, start: CivilTime, end: CivilTime, active: bool) -> AvailabilityRule {
        AvailabilityRule {
            id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            day_of_week,
            start_time: start,
            end_time: end,
            active,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn reservation(start: CivilTime, end: CivilTime, status: ReservationStatus) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            date: date!(2026 - 08 - 31),
            start_time: start,
            end_time: end,
            status,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    fn starts(slots: &[Slot]) -> Vec<(String, bool)> {
        slots
            .iter()
            .map(|s| (s.start_time.to_string(), s.available))
            .collect()
    }

    #[test]
    fn monday_two_hour_window_yields_four_open_slots() {
        let rules = [rule(1, t(9, 0), t(11, 0), true)];
        let slots = generate_slots(&rules, &[], 30).unwrap();
        assert_eq!(
            starts(&slots),
            vec![
                ("09:00".to_string(), true),
                ("09:30".to_string(), true),
                ("10:00".to_string(), true),
                ("10:30".to_string(), true),
            ]
        );
    }

    #[test]
    fn pending_reservation_blocks_only_its_interval() {
        let rules = [rule(1, t(9, 0), t(11, 0), true)];
        let taken = [reservation(t(9, 30), t(10, 0), ReservationStatus::Pending)];
        let slots = generate_slots(&rules, &taken, 30).unwrap();
        assert_eq!(
            starts(&slots),
            vec![
                ("09:00".to_string(), true),
                ("09:30".to_string(), false),
                ("10:00".to_string(), true),
                ("10:30".to_string(), true),
            ]
        );
    }

    #[test]
    fn cancelled_and_rejected_reservations_never_block() {
        let rules = [rule(1, t(9, 0), t(10, 0), true)];
        let history = [
            reservation(t(9, 0), t(9, 30), ReservationStatus::Cancelled),
            reservation(t(9, 30), t(10, 0), ReservationStatus::Rejected),
        ];
        let slots = generate_slots(&rules, &history, 30).unwrap();
        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn completed_reservation_still_blocks() {
        let rules = [rule(1, t(9, 0), t(10, 0), true)];
        let done = [reservation(t(9, 0), t(9, 30), ReservationStatus::Completed)];
        let slots = generate_slots(&rules, &done, 30).unwrap();
        assert_eq!(
            starts(&slots),
            vec![("09:00".to_string(), false), ("09:30".to_string(), true)]
        );
    }

    #[test]
    fn long_service_blocks_every_overlapping_start() {
        // A 60-minute booking at 09:00 covers both half-hour starts; the
        // 10:00 candidate with a 60-minute duration would also collide with
        // a booking at 10:30.
        let rules = [rule(1, t(9, 0), t(11, 0), true)];
        let taken = [reservation(t(10, 30), t(11, 30), ReservationStatus::Confirmed)];
        let slots = generate_slots(&rules, &taken, 60).unwrap();
        assert_eq!(
            starts(&slots),
            vec![
                ("09:00".to_string(), true),
                ("09:30".to_string(), true),
                ("10:00".to_string(), false),
                ("10:30".to_string(), false),
            ]
        );
    }

    #[test]
    fn slot_near_closing_is_still_offered() {
        // 45-minute service in a one-hour window: the 09:30 candidate runs
        // until 10:15, past closing, and is offered regardless.
        let rules = [rule(1, t(9, 0), t(10, 0), true)];
        let slots = generate_slots(&rules, &[], 45).unwrap();
        assert_eq!(
            starts(&slots),
            vec![("09:00".to_string(), true), ("09:30".to_string(), true)]
        );
    }

    #[test]
    fn candidate_running_past_midnight_does_not_panic() {
        let rules = [rule(1, t(23, 0), t(23, 59), true)];
        let slots = generate_slots(&rules, &[], 90).unwrap();
        assert_eq!(
            starts(&slots),
            vec![("23:00".to_string(), true), ("23:30".to_string(), true)]
        );
    }

    #[test]
    fn overlapping_rules_are_merged_and_deduplicated() {
        let rules = [
            rule(1, t(9, 0), t(11, 0), true),
            rule(1, t(10, 0), t(12, 0), true),
        ];
        let slots = generate_slots(&rules, &[], 30).unwrap();
        let times: Vec<String> = slots.iter().map(|s| s.start_time.to_string()).collect();
        assert_eq!(times, vec!["09:00", "09:30", "10:00", "10:30", "11:00", "11:30"]);
    }

    #[test]
    fn inactive_rules_are_ignored() {
        let rules = [
            rule(1, t(9, 0), t(10, 0), true),
            rule(1, t(14, 0), t(16, 0), false),
        ];
        let slots = generate_slots(&rules, &[], 30).unwrap();
        assert_eq!(slots.len(), 2);
        assert!(slots.iter().all(|s| s.start_time < t(10, 0)));
    }

    #[test]
    fn blackout_empties_the_day_regardless_of_rules() {
        let rules = [
            rule(1, t(9, 0), t(17, 0), true),
            rule(1, t(18, 0), t(20, 0), true),
        ];
        assert!(day_slots(true, &rules, &[], 30).unwrap().is_empty());
        // The same inputs without the blackout produce a full day.
        assert!(!day_slots(false, &rules, &[], 30).unwrap().is_empty());
    }

    #[test]
    fn blackout_does_not_mask_a_bad_duration() {
        let rules = [rule(1, t(9, 0), t(17, 0), true)];
        assert!(matches!(
            day_slots(true, &rules, &[], 0),
            Err(AppError::InvalidDuration(0))
        ));
    }

    #[test]
    fn no_rules_is_a_normal_empty_result() {
        assert!(generate_slots(&[], &[], 30).unwrap().is_empty());
    }

    #[test]
    fn non_positive_duration_is_rejected() {
        let rules = [rule(1, t(9, 0), t(10, 0), true)];
        assert!(matches!(
            generate_slots(&rules, &[], 0),
            Err(AppError::InvalidDuration(0))
        ));
        assert!(matches!(
            generate_slots(&rules, &[], -15),
            Err(AppError::InvalidDuration(-15))
        ));
    }

    #[test]
    fn generation_is_a_pure_function_of_its_inputs() {
        let rules = [rule(1, t(9, 0), t(11, 0), true)];
        let taken = [reservation(t(9, 30), t(10, 0), ReservationStatus::Confirmed)];
        let first = generate_slots(&rules, &taken, 30).unwrap();
        let second = generate_slots(&rules, &taken, 30).unwrap();
        assert_eq!(first, second);
    }
}
