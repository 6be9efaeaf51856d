//! Read access to the planning inputs.
//!
//! The planner only sees [`PlanningRepository`]; [`PgPlanningRepository`] is
//! the Postgres implementation used by the service binary.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{
        absence::Absence,
        employee::Employee,
        organization::{Location, Organization},
        shift::{RoleRequirement, ShiftDefinition, ShiftWeekday},
    },
};

#[async_trait]
pub trait PlanningRepository: Send + Sync {
    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>>;

    async fn find_location(&self, id: Uuid) -> Result<Option<Location>>;

    /// Active employees at the location, ordered by last then first name.
    async fn active_employees(&self, location_id: Uuid) -> Result<Vec<Employee>>;

    /// Active shifts at the location with their role requirements, ordered by start time.
    async fn active_shifts(&self, location_id: Uuid) -> Result<Vec<ShiftDefinition>>;

    async fn shift_weekdays(&self, location_id: Uuid) -> Result<Vec<ShiftWeekday>>;

    /// Absences of the location's employees overlapping `first_day..=last_day`.
    async fn absences_between(
        &self,
        location_id: Uuid,
        first_day: time::Date,
        last_day: time::Date,
    ) -> Result<Vec<Absence>>;
}

#[derive(Clone)]
pub struct PgPlanningRepository {
    pool: PgPool,
}

impl PgPlanningRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for the shift query.
#[derive(sqlx::FromRow)]
struct ShiftRow {
    id: Uuid,
    name: String,
    short_name: String,
    start_time: time::Time,
    end_time: time::Time,
}

/// Internal row type for the role requirement query.
#[derive(sqlx::FromRow)]
struct RequirementRow {
    shift_id: Uuid,
    role_id: Uuid,
    role_name: String,
    required_count: i32,
}

#[async_trait]
impl PlanningRepository for PgPlanningRepository {
    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>> {
        let org = sqlx::query_as::<_, Organization>(
            "SELECT id, name, timezone FROM organizations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(org)
    }

    async fn find_location(&self, id: Uuid) -> Result<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(
            "SELECT id, org_id, name, is_active FROM locations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    async fn active_employees(&self, location_id: Uuid) -> Result<Vec<Employee>> {
        let rows = sqlx::query_as::<_, Employee>(
            r#"
            SELECT e.id, e.first_name, e.last_name,
                   r.id   AS role_id,
                   r.name AS role_name,
                   l.name AS location_name,
                   e.monthly_work_hours
            FROM employees e
            JOIN roles     r ON r.id = e.role_id
            JOIN locations l ON l.id = e.location_id
            WHERE e.location_id = $1 AND e.is_active = true
            ORDER BY e.last_name, e.first_name
            "#,
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn active_shifts(&self, location_id: Uuid) -> Result<Vec<ShiftDefinition>> {
        let shifts = sqlx::query_as::<_, ShiftRow>(
            r#"
            SELECT id, name, short_name, start_time, end_time
            FROM shifts
            WHERE location_id = $1 AND is_active = true
            ORDER BY start_time, name
            "#,
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;

        let requirements = sqlx::query_as::<_, RequirementRow>(
            r#"
            SELECT sr.shift_id, r.id AS role_id, r.name AS role_name, sr.required_count
            FROM shift_roles sr
            JOIN shifts s ON s.id = sr.shift_id
            JOIN roles  r ON r.id = sr.role_id
            WHERE s.location_id = $1 AND s.is_active = true
            ORDER BY r.name
            "#,
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;

        let definitions = shifts
            .into_iter()
            .map(|s| ShiftDefinition {
                role_requirements: requirements
                    .iter()
                    .filter(|r| r.shift_id == s.id)
                    .map(|r| RoleRequirement {
                        role_id: r.role_id,
                        role_name: r.role_name.clone(),
                        required: u32::try_from(r.required_count).unwrap_or(0),
                    })
                    .collect(),
                id: s.id,
                name: s.name,
                short_name: s.short_name,
                start_time: s.start_time,
                end_time: s.end_time,
            })
            .collect();

        Ok(definitions)
    }

    async fn shift_weekdays(&self, location_id: Uuid) -> Result<Vec<ShiftWeekday>> {
        let rows = sqlx::query_as::<_, ShiftWeekday>(
            r#"
            SELECT sw.shift_id, sw.weekday
            FROM shift_weekdays sw
            JOIN shifts s ON s.id = sw.shift_id
            WHERE s.location_id = $1
            "#,
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn absences_between(
        &self,
        location_id: Uuid,
        first_day: time::Date,
        last_day: time::Date,
    ) -> Result<Vec<Absence>> {
        let rows = sqlx::query_as::<_, Absence>(
            r#"
            SELECT a.id, a.employee_id, a.start_date, a.end_date, a.absence_type, a.reason
            FROM absences a
            JOIN employees e ON e.id = a.employee_id
            WHERE e.location_id = $1
              AND a.start_date <= $3
              AND a.end_date   >= $2
            ORDER BY a.start_date
            "#,
        )
        .bind(location_id)
        .bind(first_day)
        .bind(last_day)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
