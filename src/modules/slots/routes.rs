use axum::{routing::get, Router};

use super::handlers::{get_bookable_days, get_slots};
use crate::app_state::AppState;

pub fn slots_routes() -> Router<AppState> {
    Router::new()
        .route("/providers/:provider_id/slots", get(get_slots))
        .route(
            "/providers/:provider_id/bookable-days",
            get(get_bookable_days),
        )
}
