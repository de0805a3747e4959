use chrono::{DateTime, Utc};
use expediente_core_api::{CaseState, Role};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// # Documentation
/// - One record per successful state transition of a case (historial).
/// - Never mutated or deleted; per case the records form an ordered,
///   append-only sequence from which the current state can be replayed.
/// - `justification` is present exactly when the transition rejected the
///   case.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CaseTransitionModel {
    pub id: Uuid,
    pub case_id: Uuid,
    pub from_state: CaseState,
    pub to_state: CaseState,
    pub justification: Option<HeaplessString<500>>,
    pub actor_id: Uuid,
    pub actor_role: Role,
    pub recorded_at: DateTime<Utc>,
}
