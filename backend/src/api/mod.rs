pub mod shift_plans;

use axum::{routing::{get, post}, Router};
use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(shift_plans::health))
        // Shift plans
        .route("/api/shift-plans/calculate", post(shift_plans::calculate))
        .with_state(state)
}
