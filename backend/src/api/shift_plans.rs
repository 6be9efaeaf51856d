use axum::{extract::State, Json};
use std::sync::Arc;
use validator::Validate;

use crate::{
    error::Result,
    models::calculation::{CalculateShiftPlanRequest, ShiftPlanCalculation},
    planner::ShiftPlanCalculator,
};

/// Calculates (but does not store) a month plan for one location.
///
/// An infeasible month is still a 200: the `optimization` block reports
/// status `partial` and lists what is missing.
pub async fn calculate(
    State(calculator): State<Arc<ShiftPlanCalculator>>,
    Json(req): Json<CalculateShiftPlanRequest>,
) -> Result<Json<ShiftPlanCalculation>> {
    req.validate()?;

    let calculation = calculator.calculate(&req).await?;

    Ok(Json(calculation))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}
