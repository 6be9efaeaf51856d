use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An absence (vacation, sick leave, training...) spanning `start_date..=end_date`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Absence {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub start_date: time::Date,
    pub end_date: time::Date,
    pub absence_type: String,
    pub reason: Option<String>,
}

impl Absence {
    pub fn covers(&self, date: time::Date) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}
