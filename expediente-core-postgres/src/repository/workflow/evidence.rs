use expediente_core_api::{CaseState, WorkflowError, WorkflowResult};
use expediente_core_db::models::audit::AuditEntryModel;
use expediente_core_db::models::evidence::EvidenceModel;
use tracing::debug;
use uuid::Uuid;

use crate::utils::{map_row_err, map_sqlx_err, TryFromRow};

use super::repo_impl::{insert_audit, lock_case_state, PgWorkflowStore};

impl PgWorkflowStore {
    pub(super) async fn load_evidence_impl(
        repo: &PgWorkflowStore,
        id: Uuid,
    ) -> WorkflowResult<Option<EvidenceModel>> {
        let row = sqlx::query("SELECT * FROM indicio WHERE id = $1")
            .bind(id)
            .fetch_optional(&repo.pool)
            .await
            .map_err(map_sqlx_err)?;
        row.map(|r| EvidenceModel::try_from_row(&r))
            .transpose()
            .map_err(map_row_err)
    }

    pub(super) async fn insert_evidence_impl(
        repo: &PgWorkflowStore,
        evidence: &EvidenceModel,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()> {
        let mut tx = repo.pool.begin().await.map_err(map_sqlx_err)?;

        // Lock the owner and re-assert DRAFT so a concurrent transition
        // cannot slip between the engine's check and this insert.
        let state = lock_case_state(&mut tx, evidence.case_id).await?;
        if state != CaseState::Draft {
            return Err(WorkflowError::CaseNotEditable(evidence.case_id));
        }

        sqlx::query(
            r#"
            INSERT INTO indicio (
                id, case_id, name, description, location_in_scene,
                color, size, weight,
                created_by, created_at, updated_by, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(evidence.id)
        .bind(evidence.case_id)
        .bind(evidence.name.as_str())
        .bind(evidence.description.as_str())
        .bind(evidence.location_in_scene.as_str())
        .bind(evidence.color.as_ref().map(|s| s.as_str()))
        .bind(evidence.size.as_ref().map(|s| s.as_str()))
        .bind(evidence.weight)
        .bind(evidence.created_by)
        .bind(evidence.created_at)
        .bind(evidence.updated_by)
        .bind(evidence.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        insert_audit(&mut tx, audit).await?;
        tx.commit().await.map_err(map_sqlx_err)?;
        debug!(case_id = %evidence.case_id, evidence_id = %evidence.id, "evidence row inserted");
        Ok(())
    }

    pub(super) async fn update_evidence_impl(
        repo: &PgWorkflowStore,
        evidence: &EvidenceModel,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()> {
        let mut tx = repo.pool.begin().await.map_err(map_sqlx_err)?;

        let state = lock_case_state(&mut tx, evidence.case_id).await?;
        if state != CaseState::Draft {
            return Err(WorkflowError::CaseNotEditable(evidence.case_id));
        }

        let result = sqlx::query(
            r#"
            UPDATE indicio
            SET name = $2, description = $3, location_in_scene = $4,
                color = $5, size = $6, weight = $7,
                updated_by = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(evidence.id)
        .bind(evidence.name.as_str())
        .bind(evidence.description.as_str())
        .bind(evidence.location_in_scene.as_str())
        .bind(evidence.color.as_ref().map(|s| s.as_str()))
        .bind(evidence.size.as_ref().map(|s| s.as_str()))
        .bind(evidence.weight)
        .bind(evidence.updated_by)
        .bind(evidence.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(WorkflowError::EvidenceNotFound(evidence.id));
        }

        insert_audit(&mut tx, audit).await?;
        tx.commit().await.map_err(map_sqlx_err)?;
        debug!(evidence_id = %evidence.id, "evidence row updated");
        Ok(())
    }

    pub(super) async fn delete_evidence_impl(
        repo: &PgWorkflowStore,
        evidence_id: Uuid,
        case_id: Uuid,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()> {
        let mut tx = repo.pool.begin().await.map_err(map_sqlx_err)?;

        let state = lock_case_state(&mut tx, case_id).await?;
        if state != CaseState::Draft {
            return Err(WorkflowError::CaseNotEditable(case_id));
        }

        let result = sqlx::query("DELETE FROM indicio WHERE id = $1 AND case_id = $2")
            .bind(evidence_id)
            .bind(case_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(WorkflowError::EvidenceNotFound(evidence_id));
        }

        // The audit entry carries the before-image and outlives the row.
        insert_audit(&mut tx, audit).await?;
        tx.commit().await.map_err(map_sqlx_err)?;
        debug!(case_id = %case_id, evidence_id = %evidence_id, "evidence row deleted");
        Ok(())
    }
}
