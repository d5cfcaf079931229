use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::{
    validate_rule, AvailabilityRepository, AvailabilityRule, BlackoutDate, NewAvailabilityRule,
    NewBlackoutDate, UpdateAvailabilityRule,
};
use crate::error::{AppError, AppResult};

pub async fn list_rules(
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
) -> AppResult<Json<Vec<AvailabilityRule>>> {
    let rules = AvailabilityRepository::list_rules(&state.db, provider_id).await?;
    Ok(Json(rules))
}

pub async fn create_rule(
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
    Json(new_rule): Json<NewAvailabilityRule>,
) -> AppResult<(StatusCode, Json<AvailabilityRule>)> {
    new_rule
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    validate_rule(new_rule.day_of_week, new_rule.start_time, new_rule.end_time)?;

    let rule = AvailabilityRepository::create_rule(&state.db, provider_id, &new_rule).await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

pub async fn update_rule(
    State(state): State<AppState>,
    Path((provider_id, rule_id)): Path<(Uuid, Uuid)>,
    Json(update): Json<UpdateAvailabilityRule>,
) -> AppResult<Json<AvailabilityRule>> {
    update
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    // Merge onto the stored rule so partial updates are validated as a whole.
    let current = AvailabilityRepository::get_rule(&state.db, provider_id, rule_id).await?;
    let day_of_week = update.day_of_week.unwrap_or(current.day_of_week);
    let start_time = update.start_time.unwrap_or(current.start_time);
    let end_time = update.end_time.unwrap_or(current.end_time);
    let active = update.active.unwrap_or(current.active);
    validate_rule(day_of_week, start_time, end_time)?;

    let rule = AvailabilityRepository::update_rule(
        &state.db,
        provider_id,
        rule_id,
        day_of_week,
        start_time,
        end_time,
        active,
    )
    .await?;
    Ok(Json(rule))
}

pub async fn delete_rule(
    State(state): State<AppState>,
    Path((provider_id, rule_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    AvailabilityRepository::delete_rule(&state.db, provider_id, rule_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_blackouts(
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
) -> AppResult<Json<Vec<BlackoutDate>>> {
    let blackouts = AvailabilityRepository::list_blackouts(&state.db, provider_id).await?;
    Ok(Json(blackouts))
}

pub async fn add_blackout(
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
    Json(new_blackout): Json<NewBlackoutDate>,
) -> AppResult<(StatusCode, Json<BlackoutDate>)> {
    new_blackout
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let blackout =
        AvailabilityRepository::add_blackout(&state.db, provider_id, &new_blackout).await?;
    Ok((StatusCode::CREATED, Json(blackout)))
}

pub async fn remove_blackout(
    State(state): State<AppState>,
    Path((provider_id, blackout_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    AvailabilityRepository::remove_blackout(&state.db, provider_id, blackout_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
