//! Turns roster, shift definitions and absences into an unassigned month plan.

use time::{Date, Month};
use uuid::Uuid;

use crate::error::PlanError;
use crate::models::{
    absence::Absence,
    employee::Employee,
    plan::{CalculatedShiftPlan, EmployeeDayStatus, PlanEmployee, ShiftDay, ShiftOccupancy},
    shift::{ShiftDefinition, ShiftWeekday},
};

/// Which month of which location a plan is for. Construction validates the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanTarget {
    pub organization_id: Uuid,
    pub location_id: Uuid,
    pub year: i32,
    pub month: Month,
    first_day: Date,
}

impl PlanTarget {
    pub fn new(organization_id: Uuid, location_id: Uuid, year: i32, month: u8) -> Result<Self, PlanError> {
        let invalid = PlanError::InvalidPeriod { year, month };
        if year <= 0 {
            return Err(invalid);
        }
        let month = Month::try_from(month).map_err(|_| invalid.clone())?;
        // Rejects years outside what `time::Date` can represent.
        let first_day = Date::from_calendar_date(year, month, 1).map_err(|_| invalid)?;

        Ok(Self {
            organization_id,
            location_id,
            year,
            month,
            first_day,
        })
    }

    pub fn days_in_month(&self) -> u8 {
        time::util::days_in_year_month(self.year, self.month)
    }

    pub fn first_day(&self) -> Date {
        self.first_day
    }

    pub fn last_day(&self) -> Date {
        self.date(self.days_in_month())
    }

    /// `day` is 1-based and must lie within the month.
    fn date(&self, day: u8) -> Date {
        self.first_day + time::Duration::days(i64::from(day) - 1)
    }
}

/// Everything the builder reads, already loaded by the caller.
#[derive(Debug, Clone, Copy)]
pub struct PlanInputs<'a> {
    pub employees: &'a [Employee],
    pub shifts: &'a [ShiftDefinition],
    pub weekdays: &'a [ShiftWeekday],
    pub absences: &'a [Absence],
}

/// Builds one [`ShiftDay`] per calendar day with every role slot unfilled.
///
/// Every employee appears on every day; role matching is left to the optimizer.
/// The result depends only on the arguments.
pub fn build_plan(target: &PlanTarget, inputs: &PlanInputs<'_>, today: Option<Date>) -> CalculatedShiftPlan {
    let employees: Vec<PlanEmployee> = inputs.employees.iter().map(PlanEmployee::from_employee).collect();

    let days = (1..=target.days_in_month())
        .map(|day| {
            let date = target.date(day);
            let weekday = date.weekday().number_days_from_sunday();

            let statuses = employees
                .iter()
                .map(|employee| {
                    match inputs
                        .absences
                        .iter()
                        .find(|a| a.employee_id == employee.id && a.covers(date))
                    {
                        Some(absence) => EmployeeDayStatus::absent(employee, absence),
                        None => EmployeeDayStatus::available(employee),
                    }
                })
                .collect();

            let shifts = inputs
                .shifts
                .iter()
                .filter(|shift| runs_on(inputs.weekdays, shift.id, weekday))
                .map(ShiftOccupancy::new)
                .collect();

            ShiftDay::new(date, today, statuses, shifts)
        })
        .collect();

    CalculatedShiftPlan {
        organization_id: target.organization_id,
        location_id: target.location_id,
        year: target.year,
        month: u8::from(target.month),
        employees,
        days,
    }
}

fn runs_on(weekdays: &[ShiftWeekday], shift_id: Uuid, weekday: u8) -> bool {
    weekdays
        .iter()
        .any(|w| w.shift_id == shift_id && w.weekday == i16::from(weekday))
}
