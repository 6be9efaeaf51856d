//! Shift-plan calculation: load inputs, build the empty month, fill it.

pub mod builder;
pub mod optimizer;

use std::sync::Arc;

use chrono::Datelike;
use rand::{rngs::StdRng, SeedableRng};

pub use builder::{build_plan, PlanInputs, PlanTarget};
pub use optimizer::{OptimizationRun, Optimizer, OptimizerSettings};

use crate::{
    error::Result,
    models::{
        absence::Absence,
        calculation::{CalculateShiftPlanRequest, ShiftPlanCalculation},
    },
    org_guard,
    repository::PlanningRepository,
};

/// Entry point used by the HTTP layer. Holds no per-request state, so one
/// instance serves concurrent calculations.
pub struct ShiftPlanCalculator {
    repo: Arc<dyn PlanningRepository>,
    settings: OptimizerSettings,
}

impl ShiftPlanCalculator {
    pub fn new(repo: Arc<dyn PlanningRepository>, settings: OptimizerSettings) -> Self {
        Self { repo, settings }
    }

    pub async fn calculate(&self, req: &CalculateShiftPlanRequest) -> Result<ShiftPlanCalculation> {
        let target = PlanTarget::new(req.organization_id, req.location_id, req.year, req.month)?;

        let org = org_guard::verify_organization(self.repo.as_ref(), req.organization_id).await?;
        org_guard::verify_location(self.repo.as_ref(), req.location_id, org.id).await?;

        tracing::info!(
            organization_id = %req.organization_id,
            location_id = %req.location_id,
            year = req.year,
            month = req.month,
            "calculating shift plan"
        );

        let employees = self.repo.active_employees(target.location_id).await?;
        let shifts = self.repo.active_shifts(target.location_id).await?;
        let weekdays = self.repo.shift_weekdays(target.location_id).await?;
        let absences = self.load_absences(&target).await;

        let inputs = PlanInputs {
            employees: &employees,
            shifts: &shifts,
            weekdays: &weekdays,
            absences: &absences,
        };
        let plan = build_plan(&target, &inputs, today_in(&org.timezone));

        let mut rng = match self.settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let OptimizationRun { plan, model } = Optimizer::new(self.settings.clone()).optimize(&plan, &mut rng);

        Ok(ShiftPlanCalculation {
            organization_id: plan.organization_id,
            location_id: plan.location_id,
            year: plan.year,
            month: plan.month,
            total_required: plan.total_required(),
            total_assigned: plan.total_assigned(),
            days: plan.days,
            employees: plan.employees,
            optimization: model,
        })
    }

    /// A failing absence lookup degrades to "no absences" instead of aborting the run.
    async fn load_absences(&self, target: &PlanTarget) -> Vec<Absence> {
        match self
            .repo
            .absences_between(target.location_id, target.first_day(), target.last_day())
            .await
        {
            Ok(absences) => absences,
            Err(e) => {
                tracing::error!(
                    location_id = %target.location_id,
                    "Failed to load absences, planning without them: {}",
                    e
                );
                Vec::new()
            }
        }
    }
}

/// Current date in the organization's timezone. Unknown zones fall back to UTC.
fn today_in(timezone: &str) -> Option<time::Date> {
    let tz: chrono_tz::Tz = timezone.parse().unwrap_or_else(|_| {
        tracing::warn!(timezone, "Unknown organization timezone, using UTC");
        chrono_tz::UTC
    });
    let today = chrono::Utc::now().with_timezone(&tz).date_naive();

    let month = time::Month::try_from(u8::try_from(today.month()).ok()?).ok()?;
    time::Date::from_calendar_date(today.year(), month, u8::try_from(today.day()).ok()?).ok()
}
