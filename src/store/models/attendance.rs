use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub participant_id: String,
    pub instructor_id: String,
    pub session_date: Date,
    /// Session hours, rounded to one decimal on entry.
    pub hours: f64,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewAttendance {
    pub session_date: Date,
    #[validate(range(min = 0.5, max = 12.0))]
    pub hours: f64,
    pub notes: Option<String>,
}
