use async_trait::async_trait;
use expediente_core_api::{CaseState, WorkflowError, WorkflowResult};
use expediente_core_db::models::audit::{AuditEntityKind, AuditEntryModel};
use expediente_core_db::models::case::{CaseModel, CaseStateCounts};
use expediente_core_db::models::evidence::EvidenceModel;
use expediente_core_db::models::transition::CaseTransitionModel;
use expediente_core_db::repository::case_filter::CaseFilter;
use expediente_core_db::repository::workflow_store::{CaseDetail, WorkflowStore};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::utils::{map_row_err, map_sqlx_err};

use super::rows::state_from_code;

/// `WorkflowStore` over PostgreSQL.
///
/// Every mutating method runs as one transaction: the entity write, the
/// transition record where applicable and the audit entry commit together
/// or not at all. Version checks ride the UPDATE itself
/// (`WHERE id = .. AND version = ..`), so the row lock settles concurrent
/// writers and the loser sees zero affected rows.
pub struct PgWorkflowStore {
    pub pool: PgPool,
}

impl PgWorkflowStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends the audit entry inside the caller's transaction.
pub(super) async fn insert_audit(
    tx: &mut Transaction<'_, Postgres>,
    audit: &AuditEntryModel,
) -> WorkflowResult<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_entry (
            id, entity_kind, entity_id, action,
            actor_id, actor_role, recorded_at, before, after
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(audit.id)
    .bind(audit.entity_kind.to_string())
    .bind(audit.entity_id)
    .bind(audit.action.to_string())
    .bind(audit.actor_id)
    .bind(audit.actor_role.to_string())
    .bind(audit.recorded_at)
    .bind(&audit.before)
    .bind(&audit.after)
    .execute(&mut **tx)
    .await
    .map_err(map_sqlx_err)?;
    Ok(())
}

/// Locks the owning case row and returns its current state. Evidence
/// writers call this first, so a concurrent transition on the same case
/// serializes against the evidence mutation.
pub(super) async fn lock_case_state(
    tx: &mut Transaction<'_, Postgres>,
    case_id: Uuid,
) -> WorkflowResult<CaseState> {
    let code: Option<i16> = sqlx::query_scalar("SELECT state FROM expediente WHERE id = $1 FOR UPDATE")
        .bind(case_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_sqlx_err)?;
    let code = code.ok_or(WorkflowError::CaseNotFound(case_id))?;
    state_from_code(code).map_err(map_row_err)
}

/// A conditional case UPDATE touched zero rows: either the case is gone or
/// another writer got there first.
pub(super) async fn classify_version_conflict(
    tx: &mut Transaction<'_, Postgres>,
    case_id: Uuid,
) -> WorkflowError {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM expediente WHERE id = $1)")
        .bind(case_id)
        .fetch_one(&mut **tx)
        .await;
    match exists {
        Ok(true) => WorkflowError::ConcurrentModification(case_id),
        Ok(false) => WorkflowError::CaseNotFound(case_id),
        Err(e) => map_sqlx_err(e),
    }
}

#[async_trait]
impl WorkflowStore for PgWorkflowStore {
    async fn load_case(&self, id: Uuid) -> WorkflowResult<Option<CaseModel>> {
        Self::load_case_impl(self, id).await
    }

    async fn insert_case(
        &self,
        case: &CaseModel,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()> {
        Self::insert_case_impl(self, case, audit).await
    }

    async fn update_case(
        &self,
        case: &CaseModel,
        expected_version: i32,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()> {
        Self::update_case_impl(self, case, expected_version, audit).await
    }

    async fn commit_transition(
        &self,
        case: &CaseModel,
        expected_version: i32,
        record: &CaseTransitionModel,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()> {
        Self::commit_transition_impl(self, case, expected_version, record, audit).await
    }

    async fn load_evidence(&self, id: Uuid) -> WorkflowResult<Option<EvidenceModel>> {
        Self::load_evidence_impl(self, id).await
    }

    async fn insert_evidence(
        &self,
        evidence: &EvidenceModel,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()> {
        Self::insert_evidence_impl(self, evidence, audit).await
    }

    async fn update_evidence(
        &self,
        evidence: &EvidenceModel,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()> {
        Self::update_evidence_impl(self, evidence, audit).await
    }

    async fn delete_evidence(
        &self,
        evidence_id: Uuid,
        case_id: Uuid,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()> {
        Self::delete_evidence_impl(self, evidence_id, case_id, audit).await
    }

    async fn load_detail(&self, case_id: Uuid) -> WorkflowResult<Option<CaseDetail>> {
        Self::load_detail_impl(self, case_id).await
    }

    async fn list_cases(&self, filter: &CaseFilter) -> WorkflowResult<Vec<CaseModel>> {
        Self::list_cases_impl(self, filter).await
    }

    async fn count_by_state(&self) -> WorkflowResult<CaseStateCounts> {
        Self::count_by_state_impl(self).await
    }

    async fn load_audit_trail(
        &self,
        entity_kind: AuditEntityKind,
        entity_id: Uuid,
    ) -> WorkflowResult<Vec<AuditEntryModel>> {
        Self::load_audit_trail_impl(self, entity_kind, entity_id).await
    }
}
