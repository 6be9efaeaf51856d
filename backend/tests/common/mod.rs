#![allow(dead_code)]
use std::{collections::HashSet, net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use time::macros::time;
use uuid::Uuid;

use shiftplan_backend::{
    api,
    error::{AppError, Result},
    models::{
        absence::Absence,
        employee::Employee,
        organization::{Location, Organization},
        plan::CalculatedShiftPlan,
        shift::{RoleRequirement, ShiftDefinition, ShiftWeekday},
    },
    planner::{OptimizerSettings, ShiftPlanCalculator},
    repository::PlanningRepository,
    AppState,
};

pub const ALL_WEEKDAYS: [i16; 7] = [0, 1, 2, 3, 4, 5, 6];

/// Role handle shared by employees and shift requirements.
#[derive(Debug, Clone)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
}

pub fn role(name: &str) -> Role {
    Role {
        id: Uuid::new_v4(),
        name: name.to_string(),
    }
}

pub fn employee(first_name: &str, role: &Role) -> Employee {
    Employee {
        id: Uuid::new_v4(),
        first_name: first_name.to_string(),
        last_name: "Muster".to_string(),
        role_id: role.id,
        role_name: role.name.clone(),
        location_name: "Dialyse Nord".to_string(),
        monthly_work_hours: Some(160.0),
    }
}

pub fn shift(name: &str, short_name: &str, requirements: &[(&Role, u32)]) -> ShiftDefinition {
    ShiftDefinition {
        id: Uuid::new_v4(),
        name: name.to_string(),
        short_name: short_name.to_string(),
        start_time: time!(6:00),
        end_time: time!(14:00),
        role_requirements: requirements
            .iter()
            .map(|(role, required)| RoleRequirement {
                role_id: role.id,
                role_name: role.name.clone(),
                required: *required,
            })
            .collect(),
    }
}

pub fn runs_on(shift: &ShiftDefinition, days: &[i16]) -> Vec<ShiftWeekday> {
    days.iter()
        .map(|d| ShiftWeekday {
            shift_id: shift.id,
            weekday: *d,
        })
        .collect()
}

pub fn absence(employee: &Employee, start: time::Date, end: time::Date) -> Absence {
    Absence {
        id: Uuid::new_v4(),
        employee_id: employee.id,
        start_date: start,
        end_date: end,
        absence_type: "vacation".to_string(),
        reason: Some("Urlaub".to_string()),
    }
}

/// In-memory stand-in for the Postgres repository: one organization with one location.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    pub organization: Organization,
    pub location: Location,
    pub employees: Vec<Employee>,
    pub shifts: Vec<ShiftDefinition>,
    pub weekdays: Vec<ShiftWeekday>,
    pub absences: Vec<Absence>,
    pub fail_absences: bool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        let org_id = Uuid::new_v4();
        Self {
            organization: Organization {
                id: org_id,
                name: "Test Dialyse GmbH".to_string(),
                timezone: "Europe/Berlin".to_string(),
            },
            location: Location {
                id: Uuid::new_v4(),
                org_id,
                name: "Dialyse Nord".to_string(),
                is_active: true,
            },
            employees: Vec::new(),
            shifts: Vec::new(),
            weekdays: Vec::new(),
            absences: Vec::new(),
            fail_absences: false,
        }
    }

    pub fn with_shift(mut self, shift: ShiftDefinition, days: &[i16]) -> Self {
        self.weekdays.extend(runs_on(&shift, days));
        self.shifts.push(shift);
        self
    }

    pub fn org_id(&self) -> Uuid {
        self.organization.id
    }

    pub fn location_id(&self) -> Uuid {
        self.location.id
    }
}

#[async_trait]
impl PlanningRepository for InMemoryRepository {
    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>> {
        Ok((self.organization.id == id).then(|| self.organization.clone()))
    }

    async fn find_location(&self, id: Uuid) -> Result<Option<Location>> {
        Ok((self.location.id == id).then(|| self.location.clone()))
    }

    async fn active_employees(&self, location_id: Uuid) -> Result<Vec<Employee>> {
        Ok(if location_id == self.location.id {
            self.employees.clone()
        } else {
            Vec::new()
        })
    }

    async fn active_shifts(&self, location_id: Uuid) -> Result<Vec<ShiftDefinition>> {
        Ok(if location_id == self.location.id {
            self.shifts.clone()
        } else {
            Vec::new()
        })
    }

    async fn shift_weekdays(&self, _location_id: Uuid) -> Result<Vec<ShiftWeekday>> {
        Ok(self.weekdays.clone())
    }

    async fn absences_between(
        &self,
        _location_id: Uuid,
        first_day: time::Date,
        last_day: time::Date,
    ) -> Result<Vec<Absence>> {
        if self.fail_absences {
            return Err(AppError::Internal(anyhow::anyhow!("absence store unavailable")));
        }
        Ok(self
            .absences
            .iter()
            .filter(|a| a.start_date <= last_day && a.end_date >= first_day)
            .cloned()
            .collect())
    }
}

pub fn calculator(repo: InMemoryRepository, seed: u64) -> ShiftPlanCalculator {
    ShiftPlanCalculator::new(
        Arc::new(repo),
        OptimizerSettings {
            seed: Some(seed),
            ..OptimizerSettings::default()
        },
    )
}

/// Spin up a real Axum server on a random port backed by `repo`.
pub async fn setup_test_app(repo: InMemoryRepository) -> SocketAddr {
    let state = AppState {
        calculator: Arc::new(calculator(repo, 42)),
    };
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

/// Asserts every occupancy invariant on a finished (or partial) plan.
pub fn assert_plan_invariants(plan: &CalculatedShiftPlan, hours_per_assignment: f64) {
    for day in &plan.days {
        let mut seen: HashSet<&str> = HashSet::new();
        for shift in day.shifts() {
            let mut sum = 0;
            for role in shift.roles() {
                assert!(role.assigned() <= role.required, "{} over-assigned on {}", role.role_name, day.day_key);
                assert_eq!(role.assigned() as usize, role.assigned_employees().len());
                sum += role.assigned();
            }
            assert_eq!(shift.assigned_count(), sum, "assigned_count drift on {}", day.day_key);
            assert_eq!(shift.is_correctly_staffed(), shift.assigned_count() == shift.required_count());
            assert_eq!(shift.is_under_staffed(), shift.assigned_count() < shift.required_count());
            for name in shift.assigned_employees() {
                assert!(seen.insert(name.as_str()), "{} works twice on {}", name, day.day_key);
            }
        }

        for status in day.employees() {
            if status.is_absent() {
                assert!(status.shift().is_none(), "absent {} assigned on {}", status.employee_name, day.day_key);
            }
            assert_eq!(status.is_empty(), status.shift().is_none() && !status.is_absent());
            if status.shift().is_some() {
                assert!(seen.contains(status.employee_name.as_str()));
            }
        }
    }

    for employee in &plan.employees {
        let worked = plan
            .days
            .iter()
            .filter(|d| {
                d.employees()
                    .iter()
                    .any(|s| s.employee_id == employee.id && s.shift().is_some())
            })
            .count();
        assert_eq!(employee.calculated_monthly_hours, worked as f64 * hours_per_assignment);
    }
}
