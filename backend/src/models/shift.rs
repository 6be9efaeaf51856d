use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A shift definition at a location -- what a shift looks like and who it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftDefinition {
    pub id: Uuid,
    pub name: String,
    pub short_name: String,
    pub start_time: time::Time,
    pub end_time: time::Time,
    pub role_requirements: Vec<RoleRequirement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRequirement {
    pub role_id: Uuid,
    pub role_name: String,
    pub required: u32,
}

/// Links a shift to a weekday it runs on. `weekday` is 0-6 with Sunday = 0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShiftWeekday {
    pub shift_id: Uuid,
    pub weekday: i16,
}
