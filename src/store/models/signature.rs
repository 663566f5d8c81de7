use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

use super::phase::PhaseType;
use super::user::Role;

/// One signature per (annex, role). Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    pub id: String,
    pub annex_id: String,
    pub participant_id: String,
    pub signer_user_id: String,
    pub actor_role: Role,
    pub signer_name: Option<String>,
    pub signature_data: Option<String>,
    pub signed_at: OffsetDateTime,
    /// Phase the annex belonged to when the signature was recorded.
    pub phase_snapshot: PhaseType,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct SignatureInput {
    /// Display name on the document; falls back to the actor's name.
    #[validate(length(min = 1, max = 120))]
    pub display_name: Option<String>,
    /// Optional captured signature blob (e.g. a data URL).
    #[validate(length(max = 20000))]
    pub signature_data: Option<String>,
}
