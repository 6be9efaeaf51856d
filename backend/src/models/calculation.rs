use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::plan::{PlanEmployee, ShiftDay};

/// Body of `POST /api/shift-plans/calculate`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CalculateShiftPlanRequest {
    pub organization_id: Uuid,
    pub location_id: Uuid,
    #[validate(range(min = 1, max = 9999, message = "year must be between 1 and 9999"))]
    pub year: i32,
    #[validate(range(min = 1, max = 12, message = "month must be between 1 and 12"))]
    pub month: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationStatus {
    Completed,
    Partial,
}

/// A role slot the optimizer could not fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnfilledSlot {
    pub day_key: String,
    pub shift: String,
    pub role: String,
    pub assigned: u32,
    pub required: u32,
}

/// Diagnostic summary of one optimizer run. Informational only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationModel {
    pub optimizer: String,
    pub status: OptimizationStatus,
    pub message: String,
    pub assignments_count: usize,
    pub iterations: usize,
    pub blocked_days: usize,
    pub unfilled_slots: Vec<UnfilledSlot>,
}

/// Response of a calculation: the filled month plus diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct ShiftPlanCalculation {
    pub organization_id: Uuid,
    pub location_id: Uuid,
    pub year: i32,
    pub month: u8,
    pub days: Vec<ShiftDay>,
    pub employees: Vec<PlanEmployee>,
    pub total_required: u32,
    pub total_assigned: u32,
    pub optimization: OptimizationModel,
}
