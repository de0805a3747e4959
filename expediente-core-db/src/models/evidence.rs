use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// # Documentation
/// - Database model for a physical evidence item (indicio).
/// - Owned by exactly one case for its whole life; evidence never moves
///   between cases.
/// - Mutable only while the owning case is in DRAFT; becomes immutable the
///   instant the case leaves that state. Removal is logical: the audit
///   entry is the permanent record even when storage deletes the row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EvidenceModel {
    pub id: Uuid,

    /// Owning case, immutable
    pub case_id: Uuid,

    pub name: HeaplessString<150>,
    pub description: HeaplessString<500>,
    pub location_in_scene: HeaplessString<255>,

    pub color: Option<HeaplessString<50>>,
    pub size: Option<HeaplessString<50>>,

    /// Non-negative when present
    pub weight: Option<Decimal>,

    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_by: Uuid,
    pub updated_at: DateTime<Utc>,
}
