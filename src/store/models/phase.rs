use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::annex::AnnexType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseType {
    Diagnostic,
    Training,
    Completion,
}

/// Fixed progression order: diagnostic, then training, then completion.
pub const PHASE_ORDER: [PhaseType; 3] = [
    PhaseType::Diagnostic,
    PhaseType::Training,
    PhaseType::Completion,
];

impl PhaseType {
    pub fn next(&self) -> Option<PhaseType> {
        match self {
            PhaseType::Diagnostic => Some(PhaseType::Training),
            PhaseType::Training => Some(PhaseType::Completion),
            PhaseType::Completion => None,
        }
    }

    pub fn annex_type(&self) -> AnnexType {
        match self {
            PhaseType::Diagnostic => AnnexType::Annex2,
            PhaseType::Training => AnnexType::Annex3,
            PhaseType::Completion => AnnexType::Annex5,
        }
    }

    /// Display label used on rendered documents.
    pub fn label(&self) -> &'static str {
        match self {
            PhaseType::Diagnostic => "Diagnostico",
            PhaseType::Training => "Formacion",
            PhaseType::Completion => "Finalizacion",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseType::Diagnostic => "diagnostic",
            PhaseType::Training => "training",
            PhaseType::Completion => "completion",
        }
    }
}

impl std::fmt::Display for PhaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    pub id: String,
    pub participant_id: String,
    pub phase_type: PhaseType,
    pub status: PhaseStatus,
    pub started_at: Option<OffsetDateTime>,
    pub completed_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
