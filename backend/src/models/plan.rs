//! In-memory occupancy model for one month of one location.
//!
//! The builder produces a [`CalculatedShiftPlan`] with every role slot empty;
//! the optimizer takes an owned copy and fills it through
//! [`CalculatedShiftPlan::assign`], which is the only way counters change.
//! That keeps `assigned <= required` and `assigned_count == sum(role.assigned)`
//! true after every step.

use serde::Serialize;
use uuid::Uuid;

use crate::error::PlanError;
use crate::models::{absence::Absence, employee::Employee, shift::ShiftDefinition};

/// Monthly target used when an employee has none configured.
pub const DEFAULT_MONTHLY_HOURS: f64 = 160.0;

/// Renders the `DD.MM.YYYY` key used to address a plan day.
pub fn day_key(date: time::Date) -> String {
    format!(
        "{:02}.{:02}.{:04}",
        date.day(),
        u8::from(date.month()),
        date.year()
    )
}

/// Employee as seen by one calculation, with the workload accumulator.
#[derive(Debug, Clone, Serialize)]
pub struct PlanEmployee {
    pub id: Uuid,
    pub name: String,
    pub role_id: Uuid,
    pub role_name: String,
    pub location_name: String,
    pub monthly_work_hours: f64,
    /// Hours handed out during the current run. Starts at 0, never persisted.
    pub calculated_monthly_hours: f64,
}

impl PlanEmployee {
    pub fn from_employee(employee: &Employee) -> Self {
        let monthly_work_hours = employee
            .monthly_work_hours
            .filter(|h| *h > 0.0)
            .unwrap_or(DEFAULT_MONTHLY_HOURS);

        Self {
            id: employee.id,
            name: employee.full_name(),
            role_id: employee.role_id,
            role_name: employee.role_name.clone(),
            location_name: employee.location_name.clone(),
            monthly_work_hours,
            calculated_monthly_hours: 0.0,
        }
    }

    pub fn workload_ratio(&self) -> f64 {
        self.calculated_monthly_hours / self.monthly_work_hours
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignedShift {
    pub shift_id: Uuid,
    pub short_name: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbsenceMark {
    pub absence_type: String,
    pub reason: Option<String>,
}

/// What one employee does on one day: a shift, an absence, or nothing yet.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeDayStatus {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub role_name: String,
    shift: Option<AssignedShift>,
    absence: Option<AbsenceMark>,
    is_empty: bool,
}

impl EmployeeDayStatus {
    pub fn available(employee: &PlanEmployee) -> Self {
        Self {
            employee_id: employee.id,
            employee_name: employee.name.clone(),
            role_name: employee.role_name.clone(),
            shift: None,
            absence: None,
            is_empty: true,
        }
    }

    pub fn absent(employee: &PlanEmployee, absence: &Absence) -> Self {
        Self {
            absence: Some(AbsenceMark {
                absence_type: absence.absence_type.clone(),
                reason: absence.reason.clone(),
            }),
            is_empty: false,
            ..Self::available(employee)
        }
    }

    pub fn shift(&self) -> Option<&AssignedShift> {
        self.shift.as_ref()
    }

    pub fn absence(&self) -> Option<&AbsenceMark> {
        self.absence.as_ref()
    }

    pub fn is_absent(&self) -> bool {
        self.absence.is_some()
    }

    /// Neither assigned nor absent.
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }
}

/// One role requirement inside a shift instance.
#[derive(Debug, Clone, Serialize)]
pub struct RoleOccupancy {
    pub role_id: Uuid,
    pub role_name: String,
    pub required: u32,
    assigned: u32,
    assigned_employees: Vec<String>,
}

impl RoleOccupancy {
    pub fn new(role_id: Uuid, role_name: impl Into<String>, required: u32) -> Self {
        Self {
            role_id,
            role_name: role_name.into(),
            required,
            assigned: 0,
            assigned_employees: Vec::new(),
        }
    }

    pub fn assigned(&self) -> u32 {
        self.assigned
    }

    pub fn assigned_employees(&self) -> &[String] {
        &self.assigned_employees
    }

    pub fn is_under_staffed(&self) -> bool {
        self.assigned < self.required
    }

    /// `assigned / required`; a role that needs nobody counts as full.
    pub fn occupancy_ratio(&self) -> f64 {
        if self.required == 0 {
            1.0
        } else {
            f64::from(self.assigned) / f64::from(self.required)
        }
    }
}

/// One shift instance on one day.
#[derive(Debug, Clone, Serialize)]
pub struct ShiftOccupancy {
    pub shift_id: Uuid,
    pub name: String,
    pub short_name: String,
    pub start_time: time::Time,
    pub end_time: time::Time,
    roles: Vec<RoleOccupancy>,
    assigned_employees: Vec<String>,
    assigned_count: u32,
    required_count: u32,
    is_under_staffed: bool,
    is_correctly_staffed: bool,
}

impl ShiftOccupancy {
    pub fn new(shift: &ShiftDefinition) -> Self {
        let roles: Vec<RoleOccupancy> = shift
            .role_requirements
            .iter()
            .map(|r| RoleOccupancy::new(r.role_id, r.role_name.clone(), r.required))
            .collect();
        let required_count = roles.iter().map(|r| r.required).sum();

        let mut occupancy = Self {
            shift_id: shift.id,
            name: shift.name.clone(),
            short_name: shift.short_name.clone(),
            start_time: shift.start_time,
            end_time: shift.end_time,
            roles,
            assigned_employees: Vec::new(),
            assigned_count: 0,
            required_count,
            is_under_staffed: false,
            is_correctly_staffed: false,
        };
        occupancy.refresh_flags();
        occupancy
    }

    pub fn roles(&self) -> &[RoleOccupancy] {
        &self.roles
    }

    pub fn assigned_employees(&self) -> &[String] {
        &self.assigned_employees
    }

    pub fn assigned_count(&self) -> u32 {
        self.assigned_count
    }

    pub fn required_count(&self) -> u32 {
        self.required_count
    }

    pub fn is_under_staffed(&self) -> bool {
        self.is_under_staffed
    }

    pub fn is_correctly_staffed(&self) -> bool {
        self.is_correctly_staffed
    }

    fn refresh_flags(&mut self) {
        self.is_under_staffed = self.assigned_count < self.required_count;
        self.is_correctly_staffed = self.assigned_count == self.required_count;
    }

    /// Checks the role can take one more employee without touching anything.
    fn check_room(&self, role_index: usize) -> Result<(), PlanError> {
        let role = self.roles.get(role_index).ok_or_else(|| PlanError::UnknownRole {
            shift: self.short_name.clone(),
            index: role_index,
        })?;
        if !role.is_under_staffed() {
            return Err(PlanError::RoleFull {
                shift: self.short_name.clone(),
                role: role.role_name.clone(),
            });
        }
        Ok(())
    }

    fn push(&mut self, role_index: usize, employee_name: &str) -> Result<(), PlanError> {
        self.check_room(role_index)?;
        let role = &mut self.roles[role_index];
        role.assigned += 1;
        role.assigned_employees.push(employee_name.to_string());
        self.assigned_count += 1;
        self.assigned_employees.push(employee_name.to_string());
        self.refresh_flags();
        Ok(())
    }
}

/// One calendar day of the plan.
#[derive(Debug, Clone, Serialize)]
pub struct ShiftDay {
    pub date: time::Date,
    pub day_key: String,
    pub day_number: u8,
    pub is_weekend: bool,
    pub is_today: bool,
    employees: Vec<EmployeeDayStatus>,
    shifts: Vec<ShiftOccupancy>,
}

impl ShiftDay {
    pub fn new(
        date: time::Date,
        today: Option<time::Date>,
        employees: Vec<EmployeeDayStatus>,
        shifts: Vec<ShiftOccupancy>,
    ) -> Self {
        Self {
            date,
            day_key: day_key(date),
            day_number: date.day(),
            is_weekend: matches!(date.weekday(), time::Weekday::Saturday | time::Weekday::Sunday),
            is_today: today == Some(date),
            employees,
            shifts,
        }
    }

    pub fn employees(&self) -> &[EmployeeDayStatus] {
        &self.employees
    }

    pub fn shifts(&self) -> &[ShiftOccupancy] {
        &self.shifts
    }

    pub fn has_under_staffed_role(&self) -> bool {
        self.shifts
            .iter()
            .flat_map(|s| s.roles.iter())
            .any(RoleOccupancy::is_under_staffed)
    }

    /// Anyone left who is neither assigned nor absent.
    pub fn has_free_employee(&self) -> bool {
        self.employees.iter().any(EmployeeDayStatus::is_empty)
    }

    fn assign(
        &mut self,
        shift_index: usize,
        role_index: usize,
        employee_index: usize,
    ) -> Result<(), PlanError> {
        let shift = self.shifts.get(shift_index).ok_or_else(|| PlanError::UnknownShift {
            day: self.day_key.clone(),
            index: shift_index,
        })?;
        shift.check_room(role_index)?;

        let status = &self.employees[employee_index];
        if !status.is_empty() {
            return Err(PlanError::EmployeeUnavailable {
                employee: status.employee_name.clone(),
                day: self.day_key.clone(),
            });
        }

        let assigned = AssignedShift {
            shift_id: shift.shift_id,
            short_name: shift.short_name.clone(),
            name: shift.name.clone(),
        };
        let employee_name = status.employee_name.clone();

        self.shifts[shift_index].push(role_index, &employee_name)?;
        let status = &mut self.employees[employee_index];
        status.shift = Some(assigned);
        status.is_empty = false;
        Ok(())
    }
}

/// Address of a single role slot inside a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotRef {
    pub day: usize,
    pub shift: usize,
    pub role: usize,
}

/// A role that still needs people, as reported by [`CalculatedShiftPlan::under_staffed_slots`].
#[derive(Debug, Clone, Copy)]
pub struct SlotShortage<'a> {
    pub slot: SlotRef,
    pub day: &'a ShiftDay,
    pub shift: &'a ShiftOccupancy,
    pub role: &'a RoleOccupancy,
}

/// The aggregate the optimizer works on.
#[derive(Debug, Clone, Serialize)]
pub struct CalculatedShiftPlan {
    pub organization_id: Uuid,
    pub location_id: Uuid,
    pub year: i32,
    pub month: u8,
    pub employees: Vec<PlanEmployee>,
    pub days: Vec<ShiftDay>,
}

impl CalculatedShiftPlan {
    pub fn day(&self, key: &str) -> Option<&ShiftDay> {
        self.days.iter().find(|d| d.day_key == key)
    }

    pub fn employee(&self, id: Uuid) -> Option<&PlanEmployee> {
        self.employees.iter().find(|e| e.id == id)
    }

    /// Every (day, shift, role) whose `assigned < required`, in plan order.
    pub fn under_staffed_slots(&self) -> impl Iterator<Item = SlotShortage<'_>> {
        self.days.iter().enumerate().flat_map(|(d, day)| {
            day.shifts.iter().enumerate().flat_map(move |(s, shift)| {
                shift
                    .roles
                    .iter()
                    .enumerate()
                    .filter(|(_, role)| role.is_under_staffed())
                    .map(move |(r, role)| SlotShortage {
                        slot: SlotRef { day: d, shift: s, role: r },
                        day,
                        shift,
                        role,
                    })
            })
        })
    }

    pub fn is_complete(&self) -> bool {
        self.days
            .iter()
            .flat_map(|d| d.shifts.iter())
            .flat_map(|s| s.roles.iter())
            .all(|r| r.assigned >= r.required)
    }

    pub fn total_required(&self) -> u32 {
        self.days
            .iter()
            .flat_map(|d| d.shifts.iter())
            .map(|s| s.required_count)
            .sum()
    }

    pub fn total_assigned(&self) -> u32 {
        self.days
            .iter()
            .flat_map(|d| d.shifts.iter())
            .map(|s| s.assigned_count)
            .sum()
    }

    /// Puts `employee_id` into `slot` and books `hours` on the employee's accumulator.
    ///
    /// Fails without changing anything if the slot is full, the employee is
    /// absent or already working that day, or either side is unknown.
    pub fn assign(&mut self, slot: SlotRef, employee_id: Uuid, hours: f64) -> Result<(), PlanError> {
        let day = self.days.get_mut(slot.day).ok_or(PlanError::UnknownDay(slot.day))?;
        let employee_index = day
            .employees
            .iter()
            .position(|s| s.employee_id == employee_id)
            .ok_or(PlanError::UnknownEmployee(employee_id))?;
        let employee = self
            .employees
            .iter_mut()
            .find(|e| e.id == employee_id)
            .ok_or(PlanError::UnknownEmployee(employee_id))?;

        day.assign(slot.shift, slot.role, employee_index)?;
        employee.calculated_monthly_hours += hours;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::shift::RoleRequirement;
    use time::macros::{date, time};

    fn employee(first: &str, role: &str) -> PlanEmployee {
        PlanEmployee::from_employee(&Employee {
            id: Uuid::new_v4(),
            first_name: first.into(),
            last_name: "Test".into(),
            role_id: Uuid::new_v4(),
            role_name: role.into(),
            location_name: "Nord".into(),
            monthly_work_hours: None,
        })
    }

    fn plan_with(employees: Vec<PlanEmployee>, required: u32, absent: Option<usize>) -> CalculatedShiftPlan {
        let shift = ShiftDefinition {
            id: Uuid::new_v4(),
            name: "Frühdienst".into(),
            short_name: "F".into(),
            start_time: time!(6:00),
            end_time: time!(14:00),
            role_requirements: vec![RoleRequirement {
                role_id: Uuid::new_v4(),
                role_name: "Nurse".into(),
                required,
            }],
        };
        let absence = Absence {
            id: Uuid::new_v4(),
            employee_id: Uuid::nil(),
            start_date: date!(2025 - 09 - 01),
            end_date: date!(2025 - 09 - 01),
            absence_type: "vacation".into(),
            reason: None,
        };
        let statuses = employees
            .iter()
            .enumerate()
            .map(|(i, e)| {
                if absent == Some(i) {
                    EmployeeDayStatus::absent(e, &absence)
                } else {
                    EmployeeDayStatus::available(e)
                }
            })
            .collect();
        let day = ShiftDay::new(date!(2025 - 09 - 01), None, statuses, vec![ShiftOccupancy::new(&shift)]);

        CalculatedShiftPlan {
            organization_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            year: 2025,
            month: 9,
            employees,
            days: vec![day],
        }
    }

    const SLOT: SlotRef = SlotRef { day: 0, shift: 0, role: 0 };

    #[test]
    fn assign_keeps_counters_consistent() {
        let a = employee("Anna", "Nurse");
        let b = employee("Ben", "Nurse");
        let (a_id, b_id) = (a.id, b.id);
        let mut plan = plan_with(vec![a, b], 2, None);

        plan.assign(SLOT, a_id, 8.0).unwrap();
        let shift = &plan.days[0].shifts()[0];
        assert_eq!(shift.assigned_count(), 1);
        assert!(shift.is_under_staffed());
        assert!(!shift.is_correctly_staffed());

        plan.assign(SLOT, b_id, 8.0).unwrap();
        let shift = &plan.days[0].shifts()[0];
        let role = &shift.roles()[0];
        assert_eq!(role.assigned(), 2);
        assert_eq!(role.assigned_employees().len(), 2);
        assert_eq!(shift.assigned_count(), 2);
        assert!(shift.is_correctly_staffed());
        assert!(plan.is_complete());
        assert_eq!(plan.employee(a_id).unwrap().calculated_monthly_hours, 8.0);
    }

    #[test]
    fn full_role_rejects_further_assignment() {
        let a = employee("Anna", "Nurse");
        let b = employee("Ben", "Nurse");
        let (a_id, b_id) = (a.id, b.id);
        let mut plan = plan_with(vec![a, b], 1, None);

        plan.assign(SLOT, a_id, 8.0).unwrap();
        let err = plan.assign(SLOT, b_id, 8.0).unwrap_err();
        assert!(matches!(err, PlanError::RoleFull { .. }));
        assert_eq!(plan.days[0].shifts()[0].roles()[0].assigned(), 1);
        assert!(plan.days[0].employees()[1].is_empty());
        assert_eq!(plan.employee(b_id).unwrap().calculated_monthly_hours, 0.0);
    }

    #[test]
    fn absent_or_busy_employee_is_rejected() {
        let a = employee("Anna", "Nurse");
        let b = employee("Ben", "Nurse");
        let (a_id, b_id) = (a.id, b.id);
        let mut plan = plan_with(vec![a, b], 3, Some(1));

        let err = plan.assign(SLOT, b_id, 8.0).unwrap_err();
        assert!(matches!(err, PlanError::EmployeeUnavailable { .. }));

        plan.assign(SLOT, a_id, 8.0).unwrap();
        let err = plan.assign(SLOT, a_id, 8.0).unwrap_err();
        assert!(matches!(err, PlanError::EmployeeUnavailable { .. }));
        assert_eq!(plan.total_assigned(), 1);
    }

    #[test]
    fn zero_target_hours_fall_back_to_default() {
        let mut e = employee("Anna", "Nurse");
        assert_eq!(e.monthly_work_hours, DEFAULT_MONTHLY_HOURS);
        e.calculated_monthly_hours = 80.0;
        assert_eq!(e.workload_ratio(), 0.5);

        let zero = PlanEmployee::from_employee(&Employee {
            id: Uuid::new_v4(),
            first_name: "Zoe".into(),
            last_name: "Null".into(),
            role_id: Uuid::new_v4(),
            role_name: "Nurse".into(),
            location_name: "Nord".into(),
            monthly_work_hours: Some(0.0),
        });
        assert_eq!(zero.monthly_work_hours, DEFAULT_MONTHLY_HOURS);
    }

    #[test]
    fn day_key_is_zero_padded() {
        assert_eq!(day_key(date!(2025 - 09 - 05)), "05.09.2025");
    }
}
