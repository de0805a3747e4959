use expediente_core_api::{CaseState, OfficeId, Role};
use expediente_core_db::models::audit::{AuditAction, AuditEntityKind, AuditEntryModel};
use expediente_core_db::models::case::CaseModel;
use expediente_core_db::models::evidence::EvidenceModel;
use expediente_core_db::models::transition::CaseTransitionModel;
use sqlx::{postgres::PgRow, Row};
use std::error::Error;
use std::str::FromStr;

use crate::utils::{get_heapless_string, get_optional_heapless_string, TryFromRow};

/// Decodes a lifecycle state from its SMALLINT storage code.
pub(super) fn state_from_code(code: i16) -> Result<CaseState, Box<dyn Error + Send + Sync>> {
    CaseState::from_code(code).ok_or_else(|| format!("Unknown case state code: {code}").into())
}

impl TryFromRow<PgRow> for CaseModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(CaseModel {
            id: row.try_get("id")?,
            code: get_heapless_string(row, "code")?,
            office_id: OfficeId(row.try_get("office_id")?),
            summary: get_heapless_string(row, "summary")?,
            document_ref: get_optional_heapless_string(row, "document_ref")?,
            state: state_from_code(row.try_get("state")?)?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
            version: row.try_get("version")?,
        })
    }
}

impl TryFromRow<PgRow> for EvidenceModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(EvidenceModel {
            id: row.try_get("id")?,
            case_id: row.try_get("case_id")?,
            name: get_heapless_string(row, "name")?,
            description: get_heapless_string(row, "description")?,
            location_in_scene: get_heapless_string(row, "location_in_scene")?,
            color: get_optional_heapless_string(row, "color")?,
            size: get_optional_heapless_string(row, "size")?,
            weight: row.try_get("weight")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
            updated_by: row.try_get("updated_by")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFromRow<PgRow> for CaseTransitionModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(CaseTransitionModel {
            id: row.try_get("id")?,
            case_id: row.try_get("case_id")?,
            from_state: state_from_code(row.try_get("from_state")?)?,
            to_state: state_from_code(row.try_get("to_state")?)?,
            justification: get_optional_heapless_string(row, "justification")?,
            actor_id: row.try_get("actor_id")?,
            actor_role: Role::from_str(row.try_get::<String, _>("actor_role")?.as_str())?,
            recorded_at: row.try_get("recorded_at")?,
        })
    }
}

impl TryFromRow<PgRow> for AuditEntryModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(AuditEntryModel {
            id: row.try_get("id")?,
            entity_kind: AuditEntityKind::from_str(
                row.try_get::<String, _>("entity_kind")?.as_str(),
            )?,
            entity_id: row.try_get("entity_id")?,
            action: AuditAction::from_str(row.try_get::<String, _>("action")?.as_str())?,
            actor_id: row.try_get("actor_id")?,
            actor_role: Role::from_str(row.try_get::<String, _>("actor_role")?.as_str())?,
            recorded_at: row.try_get("recorded_at")?,
            before: row.try_get("before")?,
            after: row.try_get("after")?,
        })
    }
}
