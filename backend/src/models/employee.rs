use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Active employee at a location, joined with its primary role and location name.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Employee {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub role_id: Uuid,
    pub role_name: String,
    pub location_name: String,
    /// Nominal monthly target. `None` (or 0) means the 160h default.
    pub monthly_work_hours: Option<f64>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
