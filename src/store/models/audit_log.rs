use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// Append-only trace of state-changing actions. Business logic never reads
/// these entries back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: String,
    pub actor_user_id: Option<String>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub context: Option<Value>,
    pub created_at: OffsetDateTime,
}
