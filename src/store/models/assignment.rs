use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Many-to-many relation linking instructors to the participants they
/// supervise. Backs the instructor arm of the access policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructorAssignment {
    pub id: String,
    pub instructor_id: String,
    pub participant_id: String,
    pub created_at: OffsetDateTime,
}
