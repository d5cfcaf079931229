use tracing::{debug, warn};

use crate::actor::{Actor, ActorRole};
use crate::db::{Reservation, ReservationStatus};
use crate::error::{AppError, AppResult};

/// Every status a reservation may move to from `current`. Terminal states
/// return the empty slice.
pub fn valid_transitions(current: ReservationStatus) -> &'static [ReservationStatus] {
    match current {
        ReservationStatus::Pending => &[
            ReservationStatus::Confirmed,
            ReservationStatus::Rejected,
            ReservationStatus::Cancelled,
        ],
        ReservationStatus::Confirmed => {
            &[ReservationStatus::Completed, ReservationStatus::Cancelled]
        }
        ReservationStatus::Rejected
        | ReservationStatus::Cancelled
        | ReservationStatus::Completed => &[],
    }
}

fn validate_transition(current: ReservationStatus, target: ReservationStatus) -> AppResult<()> {
    if !valid_transitions(current).contains(&target) {
        warn!(?current, ?target, "invalid status transition attempted");
        return Err(AppError::InvalidTransition(format!(
            "{current:?} -> {target:?} is not allowed"
        )));
    }
    Ok(())
}

/// Gate for a status change on a ledger entry. Transition-pair validity is
/// checked before actor authority, so a transition out of a terminal state is
/// always `InvalidTransition` no matter who asks.
pub fn authorize_transition(
    reservation: &Reservation,
    actor: &Actor,
    target: ReservationStatus,
) -> AppResult<()> {
    debug!(
        reservation_id = %reservation.id,
        current = ?reservation.status,
        ?target,
        actor_id = %actor.id,
        role = ?actor.role,
        "checking transition"
    );

    validate_transition(reservation.status, target)?;

    let allowed = match target {
        // Only the owning provider accepts, declines, or closes out work.
        ReservationStatus::Confirmed
        | ReservationStatus::Rejected
        | ReservationStatus::Completed => {
            actor.role == ActorRole::Provider && actor.id == reservation.provider_id
        }
        // Either side of the booking may cancel it.
        ReservationStatus::Cancelled => match actor.role {
            ActorRole::Customer => actor.id == reservation.customer_id,
            ActorRole::Provider => actor.id == reservation.provider_id,
        },
        // Never a transition target; creation is the only way into pending.
        ReservationStatus::Pending => false,
    };

    if !allowed {
        return Err(AppError::Forbidden(format!(
            "actor {} may not move reservation {} to {target:?}",
            actor.id, reservation.id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::clock::CivilTime;
    use sqlx::types::Uuid;
    use time::macros::date;
    use time::OffsetDateTime;

    use ReservationStatus::*;

    fn fixture(status: ReservationStatus) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            date: date!(2026 - 08 - 31),
            start_time: CivilTime::new(9, 0).unwrap(),
            end_time: CivilTime::new(9, 30).unwrap(),
            status,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    fn provider_of(r: &Reservation) -> Actor {
        Actor {
            id: r.provider_id,
            role: ActorRole::Provider,
        }
    }

    fn customer_of(r: &Reservation) -> Actor {
        Actor {
            id: r.customer_id,
            role: ActorRole::Customer,
        }
    }

    #[test]
    fn transition_table_matches_the_lifecycle() {
        assert_eq!(valid_transitions(Pending), &[Confirmed, Rejected, Cancelled]);
        assert_eq!(valid_transitions(Confirmed), &[Completed, Cancelled]);
        assert!(valid_transitions(Rejected).is_empty());
        assert!(valid_transitions(Cancelled).is_empty());
        assert!(valid_transitions(Completed).is_empty());
    }

    #[test]
    fn provider_confirms_rejects_and_completes() {
        let pending = fixture(Pending);
        let provider = provider_of(&pending);
        assert!(authorize_transition(&pending, &provider, Confirmed).is_ok());
        assert!(authorize_transition(&pending, &provider, Rejected).is_ok());

        let confirmed = fixture(Confirmed);
        let provider = provider_of(&confirmed);
        assert!(authorize_transition(&confirmed, &provider, Completed).is_ok());
    }

    #[test]
    fn both_parties_may_cancel_their_own_booking() {
        let pending = fixture(Pending);
        assert!(authorize_transition(&pending, &customer_of(&pending), Cancelled).is_ok());
        assert!(authorize_transition(&pending, &provider_of(&pending), Cancelled).is_ok());

        let confirmed = fixture(Confirmed);
        assert!(authorize_transition(&confirmed, &customer_of(&confirmed), Cancelled).is_ok());
    }

    #[test]
    fn customers_never_confirm_even_their_own_booking() {
        let pending = fixture(Pending);
        let result = authorize_transition(&pending, &customer_of(&pending), Confirmed);
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn strangers_are_forbidden() {
        let pending = fixture(Pending);
        let stranger = Actor {
            id: Uuid::new_v4(),
            role: ActorRole::Customer,
        };
        let result = authorize_transition(&pending, &stranger, Cancelled);
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let impostor_provider = Actor {
            id: Uuid::new_v4(),
            role: ActorRole::Provider,
        };
        let result = authorize_transition(&pending, &impostor_provider, Confirmed);
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn terminal_states_accept_no_transition_from_anyone() {
        for status in [Rejected, Cancelled, Completed] {
            let r = fixture(status);
            for target in [Pending, Confirmed, Rejected, Cancelled, Completed] {
                for actor in [provider_of(&r), customer_of(&r)] {
                    let result = authorize_transition(&r, &actor, target);
                    assert!(
                        matches!(result, Err(AppError::InvalidTransition(_))),
                        "{status:?} -> {target:?} should be invalid"
                    );
                }
            }
        }
    }

    #[test]
    fn repeating_a_transition_is_not_idempotent() {
        // pending -> rejected succeeds once; the customer's later cancel
        // attempt hits a terminal state.
        let mut r = fixture(Pending);
        assert!(authorize_transition(&r, &provider_of(&r), Rejected).is_ok());
        r.status = Rejected;
        let result = authorize_transition(&r, &customer_of(&r), Cancelled);
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[test]
    fn nothing_transitions_back_to_pending() {
        let confirmed = fixture(Confirmed);
        let result = authorize_transition(&confirmed, &provider_of(&confirmed), Pending);
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }
}
