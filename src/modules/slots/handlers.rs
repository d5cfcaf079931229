use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::{AvailabilityRepository, ReservationRepository, ServiceRepository};
use crate::error::{AppError, AppResult};
use crate::scheduling::clock::day_index;
use crate::scheduling::slots::{day_slots, Slot};

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: Date,
    pub service_id: Uuid,
}

/// Open-slot query for one provider and date: a read-only projection over
/// the availability model and a snapshot of the ledger. The answer is stale
/// the moment it is produced; the commit path re-validates.
pub async fn get_slots(
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> AppResult<Json<Vec<Slot>>> {
    if !within_horizon(query.date, state.env.booking.horizon_days) {
        debug!(%provider_id, date = %query.date, "slot query outside booking horizon");
        return Ok(Json(Vec::new()));
    }

    let service = ServiceRepository::get_service(&state.db, query.service_id).await?;
    if !service.active {
        return Err(AppError::NotFound(format!(
            "service {} is not bookable",
            service.id
        )));
    }

    let blackout = AvailabilityRepository::is_blackout(&state.db, provider_id, query.date).await?;
    let rules =
        AvailabilityRepository::rules_for_day(&state.db, provider_id, day_index(query.date))
            .await?;
    let reservations =
        ReservationRepository::list_for_day(&state.db, provider_id, query.date).await?;

    let slots = day_slots(blackout, &rules, &reservations, service.duration_minutes)?;
    Ok(Json(slots))
}

#[derive(Debug, Serialize)]
pub struct BookableDays {
    pub today: Date,
    pub horizon_days: i64,
    /// Weekdays (0 = Sunday) with at least one active rule; the date picker
    /// greys out everything else instead of querying slots per date.
    pub days_of_week: Vec<i16>,
}

pub async fn get_bookable_days(
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
) -> AppResult<Json<BookableDays>> {
    let days_of_week = AvailabilityRepository::active_days(&state.db, provider_id).await?;
    Ok(Json(BookableDays {
        today: OffsetDateTime::now_utc().date(),
        horizon_days: state.env.booking.horizon_days,
        days_of_week,
    }))
}

/// Dates before today or past the booking horizon have no open slots.
/// "Today" is the UTC calendar date: provider timezones are not stored, and
/// a horizon boundary that is off by a day near midnight only shifts which
/// dates are queryable, never which slots a queryable date contains.
fn within_horizon(date: Date, horizon_days: i64) -> bool {
    let today = OffsetDateTime::now_utc().date();
    date >= today && date <= today + Duration::days(horizon_days)
}
