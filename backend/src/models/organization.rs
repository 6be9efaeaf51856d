use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    /// IANA zone name, e.g. "Europe/Berlin". Used to decide which plan day is "today".
    pub timezone: String,
}

/// A site of an organization (e.g. one dialysis clinic).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Location {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub is_active: bool,
}
