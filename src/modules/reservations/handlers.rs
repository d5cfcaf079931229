use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::actor::Actor;
use crate::app_state::AppState;
use crate::db::{
    CommitReservation, Reservation, ReservationFilter, ReservationRepository, ServiceRepository,
    TransitionRequest,
};
use crate::error::{AppError, AppResult};
use crate::scheduling::lifecycle;

/// Creates a pending reservation for the exact slot the customer picked,
/// re-validated against the live ledger inside the commit transaction.
pub async fn commit_reservation(
    State(state): State<AppState>,
    Json(request): Json<CommitReservation>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = ServiceRepository::get_service(&state.db, request.service_id).await?;
    if !service.active {
        return Err(AppError::NotFound(format!(
            "service {} is not bookable",
            service.id
        )));
    }

    let reservation =
        ReservationRepository::commit(&state.db, &request, service.duration_minutes).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

pub async fn transition_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<Uuid>,
    actor: Actor,
    Json(request): Json<TransitionRequest>,
) -> AppResult<Json<Reservation>> {
    let reservation = ReservationRepository::get(&state.db, reservation_id).await?;
    lifecycle::authorize_transition(&reservation, &actor, request.target_status)?;

    // The status we authorized against is the compare in the CAS update; if
    // another actor won the race the client's view was stale.
    let updated = ReservationRepository::update_status(
        &state.db,
        reservation_id,
        reservation.status,
        request.target_status,
    )
    .await?;
    Ok(Json(updated))
}

pub async fn list_reservations(
    State(state): State<AppState>,
    Query(filter): Query<ReservationFilter>,
) -> AppResult<Json<Vec<Reservation>>> {
    let reservations = ReservationRepository::list(&state.db, &filter).await?;
    Ok(Json(reservations))
}
