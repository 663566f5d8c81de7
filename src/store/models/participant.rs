use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

/// The current phase is intentionally not stored on the record: it is
/// always derived from the participant's phase rows, so it can never drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    /// Login identity of the participant, when one exists.
    pub user_id: Option<String>,
    pub course_id: String,
    pub first_name: String,
    pub last_name: String,
    pub id_number: String,
    pub email: String,
    pub phone: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Participant {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewParticipant {
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(length(min = 1))]
    pub id_number: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub phone: String,
    pub course_id: String,
    /// When true (the default), a participant login user is created or
    /// reused by email so the person can sign their own documents.
    pub create_login: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateParticipant {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub course_id: Option<String>,
}
