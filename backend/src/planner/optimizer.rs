//! Randomized greedy assignment of employees to role slots.
//!
//! Each iteration picks a random day that still has open slots, the least
//! occupied role on that day, and the least loaded matching employee. Days
//! that cannot make further progress are blocked; the loop ends when no open
//! day is left or the iteration cap is reached.

use std::collections::HashSet;

use rand::Rng;
use uuid::Uuid;

use crate::models::{
    calculation::{OptimizationModel, OptimizationStatus, UnfilledSlot},
    plan::{CalculatedShiftPlan, ShiftDay, SlotRef},
};

pub const DEFAULT_MAX_ITERATIONS: usize = 3000;

/// Flat workload booked per assignment, independent of the shift's real length.
pub const HOURS_PER_ASSIGNMENT: f64 = 8.0;

/// Shortages listed in the diagnostic message before it is cut off.
const MESSAGE_SHORTAGE_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerSettings {
    pub max_iterations: usize,
    pub hours_per_assignment: f64,
    /// Fixed RNG seed; `None` draws from OS entropy for every run.
    pub seed: Option<u64>,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            hours_per_assignment: HOURS_PER_ASSIGNMENT,
            seed: None,
        }
    }
}

/// Filled working copy plus the diagnostic for one run.
#[derive(Debug, Clone)]
pub struct OptimizationRun {
    pub plan: CalculatedShiftPlan,
    pub model: OptimizationModel,
}

#[derive(Debug, Clone, Default)]
pub struct Optimizer {
    settings: OptimizerSettings,
}

impl Optimizer {
    pub const NAME: &'static str = "randomized-greedy";

    pub fn new(settings: OptimizerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &OptimizerSettings {
        &self.settings
    }

    /// Fills a deep copy of `plan`; the input is left untouched.
    ///
    /// Infeasible instances are not an error: they come back with
    /// [`OptimizationStatus::Partial`] and the remaining shortages listed.
    pub fn optimize<R: Rng + ?Sized>(&self, plan: &CalculatedShiftPlan, rng: &mut R) -> OptimizationRun {
        let mut working = plan.clone();
        let mut blocked_days: HashSet<usize> = HashSet::new();
        // Slots found without any eligible employee. Eligibility only shrinks
        // during a run, so they stay unfillable.
        let mut exhausted: HashSet<SlotRef> = HashSet::new();
        let mut assignments = 0usize;
        let mut iterations = 0usize;
        let mut hit_cap = true;

        while iterations < self.settings.max_iterations {
            iterations += 1;

            let open_days: Vec<usize> = working
                .days
                .iter()
                .enumerate()
                .filter(|(i, day)| !blocked_days.contains(i) && day.has_under_staffed_role())
                .map(|(i, _)| i)
                .collect();
            if open_days.is_empty() {
                hit_cap = false;
                break;
            }

            let day_index = open_days[rng.gen_range(0..open_days.len())];
            let day = &working.days[day_index];

            let Some(slot) = least_occupied_slot(day, day_index, &exhausted) else {
                tracing::debug!(day = %day.day_key, "no fillable role left, blocking day");
                blocked_days.insert(day_index);
                continue;
            };

            let role_name = &day.shifts()[slot.shift].roles()[slot.role].role_name;
            let candidate = least_loaded_employee(&working, day, role_name);
            let has_free_employee = day.has_free_employee();

            match candidate {
                Some(employee_id) => {
                    match working.assign(slot, employee_id, self.settings.hours_per_assignment) {
                        Ok(()) => {
                            assignments += 1;
                            tracing::trace!(?slot, %employee_id, "assigned");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, ?slot, "assignment rejected by plan");
                            exhausted.insert(slot);
                        }
                    }
                }
                None if !has_free_employee => {
                    tracing::debug!(day = %working.days[day_index].day_key, "nobody left to assign, blocking day");
                    blocked_days.insert(day_index);
                }
                None => {
                    exhausted.insert(slot);
                }
            }
        }

        let model = self.diagnose(&working, assignments, iterations, blocked_days.len(), hit_cap);
        tracing::info!(
            status = ?model.status,
            assignments,
            iterations,
            blocked_days = model.blocked_days,
            "optimization finished"
        );

        OptimizationRun { plan: working, model }
    }

    fn diagnose(
        &self,
        plan: &CalculatedShiftPlan,
        assignments: usize,
        iterations: usize,
        blocked_days: usize,
        hit_cap: bool,
    ) -> OptimizationModel {
        let unfilled_slots: Vec<UnfilledSlot> = plan
            .under_staffed_slots()
            .map(|s| UnfilledSlot {
                day_key: s.day.day_key.clone(),
                shift: s.shift.short_name.clone(),
                role: s.role.role_name.clone(),
                assigned: s.role.assigned(),
                required: s.role.required,
            })
            .collect();

        let (status, message) = if plan.is_complete() {
            (
                OptimizationStatus::Completed,
                format!(
                    "All {} required slots filled with {} assignments in {} iterations",
                    plan.total_required(),
                    assignments,
                    iterations
                ),
            )
        } else {
            let mut message = format!(
                "{} of {} required slots filled with {} assignments in {} iterations; {} blocked days",
                plan.total_assigned(),
                plan.total_required(),
                assignments,
                iterations,
                blocked_days
            );
            if hit_cap {
                message.push_str(&format!(
                    "; iteration limit of {} reached",
                    self.settings.max_iterations
                ));
            }
            message.push_str(&format!(". Still short: {}", describe_shortages(&unfilled_slots)));
            (OptimizationStatus::Partial, message)
        };

        OptimizationModel {
            optimizer: Self::NAME.to_string(),
            status,
            message,
            assignments_count: assignments,
            iterations,
            blocked_days,
            unfilled_slots,
        }
    }
}

/// Under-staffed role with the lowest `assigned / required` on `day`.
/// Ties go to the first shift, then the first role.
fn least_occupied_slot(day: &ShiftDay, day_index: usize, exhausted: &HashSet<SlotRef>) -> Option<SlotRef> {
    let mut best: Option<(SlotRef, f64)> = None;

    for (shift_index, shift) in day.shifts().iter().enumerate() {
        for (role_index, role) in shift.roles().iter().enumerate() {
            if !role.is_under_staffed() {
                continue;
            }
            let slot = SlotRef {
                day: day_index,
                shift: shift_index,
                role: role_index,
            };
            if exhausted.contains(&slot) {
                continue;
            }
            let ratio = role.occupancy_ratio();
            if best.map_or(true, |(_, best_ratio)| ratio < best_ratio) {
                best = Some((slot, ratio));
            }
        }
    }

    best.map(|(slot, _)| slot)
}

/// Free employee of `role_name` with the lowest workload ratio.
/// Ties go to whoever comes first in the roster.
fn least_loaded_employee(plan: &CalculatedShiftPlan, day: &ShiftDay, role_name: &str) -> Option<Uuid> {
    let mut best: Option<(Uuid, f64)> = None;

    for status in day.employees() {
        if !status.is_empty() || status.role_name != role_name {
            continue;
        }
        let Some(employee) = plan.employee(status.employee_id) else {
            continue;
        };
        let ratio = employee.workload_ratio();
        if best.map_or(true, |(_, best_ratio)| ratio < best_ratio) {
            best = Some((employee.id, ratio));
        }
    }

    best.map(|(id, _)| id)
}

fn describe_shortages(slots: &[UnfilledSlot]) -> String {
    let mut parts: Vec<String> = slots
        .iter()
        .take(MESSAGE_SHORTAGE_LIMIT)
        .map(|s| format!("{} {}/{} ({}/{})", s.day_key, s.shift, s.role, s.assigned, s.required))
        .collect();
    if slots.len() > MESSAGE_SHORTAGE_LIMIT {
        parts.push(format!("and {} more", slots.len() - MESSAGE_SHORTAGE_LIMIT));
    }
    parts.join(", ")
}
