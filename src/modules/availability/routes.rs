use axum::{
    routing::{delete, get},
    Router,
};

use super::handlers::{
    add_blackout, create_rule, delete_rule, list_blackouts, list_rules, remove_blackout,
    update_rule,
};
use crate::app_state::AppState;

pub fn availability_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/providers/:provider_id/availability",
            get(list_rules).post(create_rule),
        )
        .route(
            "/providers/:provider_id/availability/:rule_id",
            delete(delete_rule).patch(update_rule),
        )
        .route(
            "/providers/:provider_id/blackouts",
            get(list_blackouts).post(add_blackout),
        )
        .route(
            "/providers/:provider_id/blackouts/:blackout_id",
            delete(remove_blackout),
        )
}
