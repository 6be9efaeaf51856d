pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod org_guard;
pub mod planner;
pub mod repository;

use std::sync::Arc;

use planner::ShiftPlanCalculator;

/// Shared application state available to all handlers via axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    pub calculator: Arc<ShiftPlanCalculator>,
}

impl axum::extract::FromRef<AppState> for Arc<ShiftPlanCalculator> {
    fn from_ref(state: &AppState) -> Self {
        state.calculator.clone()
    }
}
