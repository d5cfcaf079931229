use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{commit_reservation, list_reservations, transition_reservation};
use crate::app_state::AppState;

pub fn reservations_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reservations",
            get(list_reservations).post(commit_reservation),
        )
        .route(
            "/reservations/:reservation_id/transition",
            post(transition_reservation),
        )
}
